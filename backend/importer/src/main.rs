use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// JSON file with the names to import
    file: PathBuf,

    #[arg(long, default_value = "http://127.0.0.1:3000")]
    url: String,

    #[arg(long, default_value_t = 100)]
    batch_size: usize,

    /// Admin account recorded as the importer
    #[arg(long, default_value = "importer")]
    user_id: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let names = importer::read_names(&args.file)?;
    println!("Loaded Names: {}\n", names.len());

    let summary = importer::import_names(&args.url, &args.user_id, &names, args.batch_size).await?;

    println!("Imported: {}", summary.imported);
    println!("Failed: {}", summary.failed);
    Ok(())
}
