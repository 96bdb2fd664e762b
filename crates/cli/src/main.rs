//! Command-line driver for the slip scan pipeline.
//!
//! Runs prepare → recognize → extract on a local image and prints the
//! extracted fields as JSON, optionally submitting them to a running server.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use slipkeep_ocr::{CropRegion, CropSelection, LanguageHint, MockRecognizer, ScanResult, SlipScanner};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Slip scanner - extract expense fields from receipt images
#[derive(Parser)]
#[command(name = "slipkeep")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan a slip image and print the extracted fields as JSON
    Scan(ScanArgs),
}

#[derive(Args)]
struct ScanArgs {
    /// Path to the slip image (JPEG or PNG)
    image: PathBuf,

    /// Crop region in display pixels: x,y,width,height
    #[arg(long, value_name = "X,Y,W,H", requires = "display")]
    crop: Option<String>,

    /// Display size the crop was drawn at: WIDTHxHEIGHT
    #[arg(long, value_name = "WxH", requires = "crop")]
    display: Option<String>,

    /// Language hint for the OCR engine (eng, tha, eng+tha)
    #[arg(long, default_value = "eng+tha")]
    lang: LanguageHint,

    /// Skip OCR and feed pre-recognized text from this file through the
    /// extractor instead (works without the `tesseract` feature)
    #[arg(long, value_name = "FILE")]
    text: Option<PathBuf>,

    /// Submit the scanned slip to a running server, e.g. http://127.0.0.1:3001
    #[arg(long, value_name = "URL")]
    submit: Option<String>,

    /// Expense category used when submitting
    #[arg(long, default_value = "other")]
    category: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Scan(args) => scan(args).await,
    }
}

async fn scan(args: ScanArgs) -> anyhow::Result<()> {
    let data = tokio::fs::read(&args.image)
        .await
        .with_context(|| format!("reading {}", args.image.display()))?;

    let crop = match (&args.crop, &args.display) {
        (Some(region), Some(display)) => Some(parse_crop(region, display)?),
        _ => None,
    };

    let result = match &args.text {
        Some(path) => {
            let text = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("reading {}", path.display()))?;
            SlipScanner::new(MockRecognizer::new(text))
                .scan(&data, crop.as_ref(), args.lang)
                .await?
        }
        None => scan_with_engine(&data, crop.as_ref(), args.lang).await?,
    };

    tracing::debug!(ocr_text = %result.ocr_text, "recognized text");
    println!("{}", serde_json::to_string_pretty(&result.receipt)?);

    if let Some(server) = &args.submit {
        submit(server, &args, &result).await?;
    }
    Ok(())
}

#[cfg(feature = "tesseract")]
async fn scan_with_engine(
    data: &[u8],
    crop: Option<&CropSelection>,
    hint: LanguageHint,
) -> anyhow::Result<ScanResult> {
    use slipkeep_ocr::recognizer::tesseract_backend::TesseractRecognizer;
    let scanner = SlipScanner::new(TesseractRecognizer::new(None));
    Ok(scanner.scan(data, crop, hint).await?)
}

#[cfg(not(feature = "tesseract"))]
async fn scan_with_engine(
    _data: &[u8],
    _crop: Option<&CropSelection>,
    _hint: LanguageHint,
) -> anyhow::Result<ScanResult> {
    bail!("built without the `tesseract` feature; pass --text FILE with pre-recognized text")
}

/// POST the slip plus the extracted fields to `/api/slips/create-expense`.
async fn submit(server: &str, args: &ScanArgs, result: &ScanResult) -> anyhow::Result<()> {
    let receipt = &result.receipt;
    let filename = args
        .image
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("slip.jpg")
        .to_string();

    let slip = reqwest::multipart::Part::bytes(tokio::fs::read(&args.image).await?)
        .file_name(filename)
        .mime_str(mime_for(&args.image))?;

    let mut form = reqwest::multipart::Form::new()
        .part("slip", slip)
        .text("category", args.category.clone());
    if let Some(description) = &receipt.description {
        form = form.text("description", description.clone());
    }
    if let Some(amount) = &receipt.amount {
        form = form.text("amount", amount.clone());
    }
    if let Some(date) = receipt.date {
        form = form.text("date", date.to_string());
    }
    if !receipt.items.is_empty() {
        form = form.text("items", serde_json::to_string(&receipt.items)?);
    }

    let url = format!("{}/api/slips/create-expense", server.trim_end_matches('/'));
    let response = reqwest::Client::new()
        .post(&url)
        .multipart(form)
        .send()
        .await
        .with_context(|| format!("posting to {url}"))?;

    let status = response.status();
    let body: serde_json::Value = response
        .json()
        .await
        .unwrap_or(serde_json::Value::Null);
    if !status.is_success() {
        bail!("server rejected the slip ({status}): {body}");
    }

    tracing::info!(%url, "expense created");
    println!("{}", serde_json::to_string_pretty(&body)?);
    Ok(())
}

fn parse_crop(region: &str, display: &str) -> anyhow::Result<CropSelection> {
    let parts: Vec<f64> = region
        .split(',')
        .map(|p| p.trim().parse::<f64>())
        .collect::<Result<_, _>>()
        .context("crop must be four numbers: x,y,width,height")?;
    let [x, y, width, height] = parts[..] else {
        bail!("crop must be four numbers: x,y,width,height");
    };

    let (dw, dh) = display
        .split_once(['x', 'X'])
        .context("display must be WIDTHxHEIGHT")?;
    let display_width: f64 = dw.trim().parse().context("display must be WIDTHxHEIGHT")?;
    let display_height: f64 = dh.trim().parse().context("display must be WIDTHxHEIGHT")?;

    Ok(CropSelection {
        region: CropRegion { x, y, width, height },
        display_width,
        display_height,
    })
}

fn mime_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .as_deref()
    {
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("pdf") => "application/pdf",
        _ => "image/jpeg",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crop_spec_parses() {
        let sel = parse_crop("10, 20, 300, 400", "800x600").unwrap();
        assert_eq!(sel.region.x, 10.0);
        assert_eq!(sel.region.height, 400.0);
        assert_eq!(sel.display_width, 800.0);
        assert_eq!(sel.display_height, 600.0);
    }

    #[test]
    fn crop_spec_rejects_wrong_arity() {
        assert!(parse_crop("1,2,3", "800x600").is_err());
        assert!(parse_crop("1,2,3,4", "800").is_err());
    }

    #[test]
    fn mime_falls_back_to_jpeg() {
        assert_eq!(mime_for(Path::new("a.png")), "image/png");
        assert_eq!(mime_for(Path::new("a.jpg")), "image/jpeg");
        assert_eq!(mime_for(Path::new("noext")), "image/jpeg");
    }
}
