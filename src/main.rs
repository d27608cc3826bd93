use clap::Parser;
use story_pages::{Client, ClientBuilder, ContentBlock, ContentUnit, RenderedPage};

mod args;
use args::{Args, OutputFormat};

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::init();

    // Parse command-line arguments
    let args = Args::parse();

    let client = match build_client(&args) {
        Ok(client) => client,
        Err(e) => {
            ::log::error!("Failed to set up client: {}", e);
            std::process::exit(2);
        }
    };

    if args.clear_cache {
        if client.clear_cache() {
            ::log::info!("Cache cleared");
        } else if args.no_cache {
            ::log::warn!("--clear-cache has no effect together with --no-cache");
        }
    }

    let Some(text_url) = args.text_url.clone() else {
        return;
    };

    let unit = ContentUnit::new(args.title.clone(), text_url);
    let start_time = std::time::Instant::now();

    let page = match client.render_part(&unit).await {
        Ok(page) => page,
        Err(e) => {
            ::log::error!("Failed to render '{}': {}", unit.title, e);
            std::process::exit(1);
        }
    };

    ::log::info!(
        "Rendered {} blocks in {:.2} seconds",
        page.blocks().len(),
        start_time.elapsed().as_secs_f64()
    );

    match args.format {
        OutputFormat::Text => print_page(&page),
        OutputFormat::Json => match serde_json::to_string_pretty(&page) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                ::log::error!("Failed to serialize page: {}", e);
                std::process::exit(1);
            }
        },
    }
}

fn build_client(args: &Args) -> story_pages::Result<Client> {
    let mut builder = ClientBuilder::new();

    if let Some(path) = &args.config {
        ::log::debug!("Loading configuration from {}", path.display());
        builder = builder.with_config_file(path)?;
    }

    // Command-line overrides
    if let Some(dir) = &args.cache_dir {
        builder = builder.with_cache_dir(dir);
    }
    if args.no_cache {
        builder = builder.with_use_cache(false);
    }

    builder.build()
}

fn print_page(page: &RenderedPage) {
    println!("--- START OF PART: {} ---", page.title());
    for block in page.blocks() {
        match block {
            ContentBlock::Text(_) => println!("{}", block.plain_text().trim()),
            ContentBlock::Image(url) => println!("[IMAGE: {}]", url),
        }
        println!();
    }
    println!("--- END OF PART ---");
}
