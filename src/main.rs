use std::env;
use std::process;

use fetch_recipes::{
    AppConfig, Cuisine, FilterConfig, ImageSize, Recipe, RecipeStore, SortOrder,
};
use log::{debug, info};

const USAGE: &str = "Usage: fetch-recipes [--endpoint URL] [--cuisine NAME]... \
[--require-website] [--require-video] [--sort | --sort-order asc|desc] [--load-images] [--json]";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SortMode {
    Unsorted,
    Toggle,
    Explicit(SortOrder),
}

#[derive(Debug)]
struct CliOptions {
    endpoint: Option<String>,
    filter: FilterConfig,
    sort: SortMode,
    load_images: bool,
    json: bool,
}

fn parse_args(args: &[String]) -> Result<CliOptions, String> {
    let mut options = CliOptions {
        endpoint: None,
        filter: FilterConfig::default(),
        sort: SortMode::Unsorted,
        load_images: false,
        json: false,
    };

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--endpoint" => {
                let value = iter.next().ok_or("--endpoint requires a value")?;
                options.endpoint = Some(value.clone());
            }
            "--cuisine" => {
                let value = iter.next().ok_or("--cuisine requires a value")?;
                // Known cuisines are normalised to their canonical spelling
                let name = value
                    .parse::<Cuisine>()
                    .map(|c| c.as_str().to_string())
                    .unwrap_or_else(|_| value.clone());
                options.filter.cuisines.insert(name);
            }
            "--require-website" => options.filter.require_website = true,
            "--require-video" => options.filter.require_video = true,
            "--sort" => options.sort = SortMode::Toggle,
            "--sort-order" => {
                let value = iter.next().ok_or("--sort-order requires a value")?;
                let order = match value.as_str() {
                    "asc" => SortOrder::Ascending,
                    "desc" => SortOrder::Descending,
                    other => return Err(format!("Unknown sort order: {}", other)),
                };
                options.sort = SortMode::Explicit(order);
            }
            "--load-images" => options.load_images = true,
            "--json" => options.json = true,
            "-h" | "--help" => return Err(USAGE.to_string()),
            other => return Err(format!("Unknown argument: {}\n{}", other, USAGE)),
        }
    }

    Ok(options)
}

fn describe(recipe: &Recipe) -> String {
    let mut line = format!("{} ({})", recipe.name, recipe.cuisine);
    if recipe.has_source_website() {
        line.push_str(" [website]");
    }
    if recipe.has_youtube_video() {
        line.push_str(" [video]");
    }
    line
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    let options = parse_args(&args)?;
    debug!("{:?}", options);

    let mut config = AppConfig::load()?;
    if let Some(endpoint) = options.endpoint.clone() {
        config.endpoint = endpoint;
    }
    info!("Fetching recipes from {}", config.endpoint);

    let store = RecipeStore::from_config(&config)?;
    store.set_filter(options.filter.clone());

    if let Err(e) = store.refresh().await {
        eprintln!("{}", e.user_message());
        debug!("{}", e);
        process::exit(1);
    }

    match options.sort {
        SortMode::Unsorted => {}
        SortMode::Toggle => {
            store.sort();
        }
        SortMode::Explicit(order) => store.sort_with(order),
    }

    if options.load_images {
        let loaded = store.load_visible().await;
        info!("Loaded {} thumbnails", loaded);
    }

    let visible = store.visible();

    if options.json {
        println!("{}", serde_json::to_string_pretty(&visible)?);
        return Ok(());
    }

    if visible.is_empty() {
        println!("No recipes found");
        return Ok(());
    }

    for recipe in &visible {
        if options.load_images {
            let thumbnail = store.image_state(&recipe.id, ImageSize::Small);
            println!("{} [thumbnail: {}]", describe(recipe), thumbnail.label());
        } else {
            println!("{}", describe(recipe));
        }
    }

    Ok(())
}
