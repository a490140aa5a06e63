use clap::{Parser, Subcommand, ValueEnum};
use qhdm::scraper::WebScraper;
use qhdm::types::FetchRecord;
use qhdm::{export, flatten, parser, policy};
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(name = "qhdm")]
#[command(about = "A stats.gov.cn administrative division scraper", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    Records {
        #[arg(
            short = 'o',
            long = "output",
            value_enum,
            default_value = "text",
            help = "Output format (text or json)"
        )]
        format: OutputFormat,
    },
    Crawl {
        #[arg(
            long,
            default_value = "china_area_data.json",
            help = "Path of the JSON tree artifact"
        )]
        output: PathBuf,

        #[arg(long, help = "Also write a province/city/county CSV zip bundle here")]
        bundle: Option<PathBuf>,

        #[arg(long, help = "Do not append Taiwan, Hong Kong and Macao")]
        skip_supplemental: bool,

        #[arg(
            short = 'o',
            long = "output-format",
            value_enum,
            default_value = "text",
            help = "Run summary format (text or json)"
        )]
        format: OutputFormat,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Records { format } => {
            let scraper = match WebScraper::new() {
                Ok(s) => s,
                Err(e) => {
                    eprintln!("Error creating scraper: {}", e);
                    process::exit(1);
                }
            };

            println!("Fetching publish records from {}...", scraper.index_url());

            let records = match scraper.fetch_publish_records() {
                Ok(records) => records,
                Err(e) => {
                    eprintln!("Error fetching publish records: {}", e);
                    process::exit(1);
                }
            };

            match format {
                OutputFormat::Json => match serde_json::to_string_pretty(&records) {
                    Ok(json) => println!("{}", json),
                    Err(e) => {
                        eprintln!("Error serializing to JSON: {}", e);
                        process::exit(1);
                    }
                },
                OutputFormat::Text => {
                    println!("Found {} releases (newest first):", records.len());
                    for (i, record) in records.iter().enumerate() {
                        println!("{}. {} - {}", i + 1, record.date, record.link);
                    }
                }
            }
        }
        Commands::Crawl {
            output,
            bundle,
            skip_supplemental,
            format,
        } => {
            let scraper = match WebScraper::new() {
                Ok(s) => s,
                Err(e) => {
                    eprintln!("Error creating scraper: {}", e);
                    process::exit(1);
                }
            };

            println!("Resolving newest release from {}...", scraper.index_url());

            let records = match scraper.fetch_publish_records() {
                Ok(records) => records,
                Err(e) => {
                    eprintln!("Error fetching publish records: {}", e);
                    process::exit(1);
                }
            };
            let Some(newest) = records.first() else {
                eprintln!("Error: index page lists no releases");
                process::exit(1);
            };

            println!("Crawling release {} ({})...", newest.date, newest.link);

            let prefix_url = parser::prefix_of(&newest.link);
            let mut provinces = match scraper.crawl(&prefix_url) {
                Ok(provinces) => provinces,
                Err(e) => {
                    eprintln!("Error crawling {}: {}", prefix_url, e);
                    process::exit(1);
                }
            };

            if !skip_supplemental {
                provinces.extend(policy::supplemental_provinces());
            }

            let rows = flatten::flatten(&provinces);

            // All-or-nothing: an incomplete hierarchy writes no artifact.
            if let Err(e) = export::verify_integrity(&rows) {
                eprintln!("Error: {}", e);
                process::exit(1);
            }

            if let Err(e) = export::write_json_tree(&output, &provinces) {
                eprintln!("Error writing {}: {}", output.display(), e);
                process::exit(1);
            }

            if let Some(ref bundle_path) = bundle {
                let data = match export::csv_bundle(&rows) {
                    Ok(data) => data,
                    Err(e) => {
                        eprintln!("Error building CSV bundle: {}", e);
                        process::exit(1);
                    }
                };
                if let Err(e) = std::fs::write(bundle_path, data) {
                    eprintln!("Error writing {}: {}", bundle_path.display(), e);
                    process::exit(1);
                }
            }

            let artifact = bundle
                .as_ref()
                .unwrap_or(&output)
                .display()
                .to_string();
            let record = FetchRecord::new(newest.date.as_str(), artifact);

            match format {
                OutputFormat::Json => match serde_json::to_string_pretty(&record) {
                    Ok(json) => println!("{}", json),
                    Err(e) => {
                        eprintln!("Error serializing to JSON: {}", e);
                        process::exit(1);
                    }
                },
                OutputFormat::Text => {
                    let city_count: usize = provinces.iter().map(|p| p.cities.len()).sum();
                    let leaf_count: usize = provinces
                        .iter()
                        .flat_map(|p| &p.cities)
                        .map(|c| c.counties.len())
                        .sum();

                    println!("Wrote {}", output.display());
                    if let Some(ref bundle_path) = bundle {
                        println!("Wrote {}", bundle_path.display());
                    }
                    println!("\nStatistics:");
                    println!("  Release date: {}", record.update_at);
                    println!("  Provinces:    {}", provinces.len());
                    println!("  Cities:       {}", city_count);
                    println!("  Counties:     {}", leaf_count);
                    println!("  Flat rows:    {}", rows.len());
                }
            }
        }
    }
}
