use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wayfarer_media::catalog::{Catalog, CatalogFilter, CatalogKind};
use wayfarer_media::config::{self, ClientConfig, ServerConfig};
use wayfarer_media::models::{UploadFile, UploadRequest};
use wayfarer_media::routes;
use wayfarer_media::signing::SignatureIssuer;
use wayfarer_media::uploader::Uploader;

#[derive(Debug, Parser)]
#[command(name = "wayfarer-media")]
#[command(about = "Signed media uploads and catalog API for the travel site")]
struct CliArgs {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server (signature endpoint, catalog, health).
    Serve,
    /// Upload files through the signature endpoint and print their URLs.
    Upload {
        /// Provider folder to upload into.
        #[arg(long, default_value = "")]
        folder: String,
        #[arg(value_name = "FILE", required = true)]
        files: Vec<PathBuf>,
    },
    /// Print an upload signature issued with the local credentials.
    Sign {
        #[arg(long, default_value = "")]
        folder: String,
    },
    /// Print catalog items matching the given filters as JSON.
    Catalog {
        /// accommodations, destinations or itineraries.
        #[arg(value_parser = parse_kind_arg)]
        kind: CatalogKind,
        #[arg(long)]
        destination: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        region: Option<String>,
        /// Catalog document; defaults to CATALOG_PATH.
        #[arg(long)]
        path: Option<PathBuf>,
    },
}

fn parse_kind_arg(input: &str) -> std::result::Result<CatalogKind, String> {
    input.parse::<CatalogKind>().map_err(|_| {
        format!(
            "Unknown catalog '{}'. Expected accommodations, destinations or itineraries",
            input
        )
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wayfarer_media=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = CliArgs::parse();

    if let Err(e) = run(args.command).await {
        error!("{:#}", e);
        std::process::exit(1);
    }
    Ok(())
}

async fn run(command: Command) -> Result<()> {
    match command {
        Command::Serve => {
            let config = ServerConfig::from_env().context("Failed to load server configuration")?;
            info!("Starting wayfarer-media server");
            routes::serve(config).await?;
        }
        Command::Upload { folder, files } => {
            let config = ClientConfig::from_env()?;
            let uploader = Uploader::from_config(&config)?;

            let mut uploads = Vec::with_capacity(files.len());
            for path in &files {
                let file = UploadFile::from_path(path)
                    .await
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                uploads.push(file);
            }

            let urls = match uploader.upload_many(&uploads, &folder).await {
                Ok(urls) => urls,
                Err(e) => {
                    eprintln!("{}", e.client_message());
                    return Err(e.into());
                }
            };
            for url in urls {
                println!("{}", url);
            }
        }
        Command::Sign { folder } => {
            let config = ServerConfig::from_env().context("Failed to load signing credentials")?;
            let issuer = SignatureIssuer::new(config.credentials, config.upload_preset)
                .with_algorithm(config.signature_algorithm);
            let signature = issuer.issue(&UploadRequest::new(folder))?;
            println!("{}", serde_json::to_string_pretty(&signature)?);
        }
        Command::Catalog {
            kind,
            destination,
            category,
            region,
            path,
        } => {
            let path = path.unwrap_or_else(config::catalog_path_from_env);
            let catalog = Catalog::from_file(&path)?;
            let filter = CatalogFilter {
                destination,
                category,
                region,
            };
            let items = catalog.filtered_json(kind, &filter)?;
            println!("{}", serde_json::to_string_pretty(&items)?);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_kind_arg_valid() {
        assert_eq!(
            parse_kind_arg("destinations").unwrap(),
            CatalogKind::Destinations
        );
    }

    #[test]
    fn test_parse_kind_arg_invalid() {
        let err = parse_kind_arg("blog").unwrap_err();
        assert!(err.contains("accommodations"));
    }

    #[test]
    fn test_upload_requires_files() {
        assert!(CliArgs::try_parse_from(["wayfarer-media", "upload", "--folder", "blog"]).is_err());

        let args =
            CliArgs::try_parse_from(["wayfarer-media", "upload", "--folder", "blog", "a.jpg"])
                .unwrap();
        match args.command {
            Command::Upload { folder, files } => {
                assert_eq!(folder, "blog");
                assert_eq!(files, vec![PathBuf::from("a.jpg")]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
