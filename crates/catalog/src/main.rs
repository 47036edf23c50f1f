use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};

use cinema_catalog::seed::demo_movies;
use cinema_catalog::{MovieCatalog, PurchaseKind, SearchCriteria};
use cinema_core::{Repository, Specification};
use cinema_infra::repository::sql::filter_sql;
use cinema_infra::{Config, InMemoryRepository, PostgresMovieRepository, StoreConfig};
use cinema_movies::{AvailableOnSecondaryMedia, Movie, MovieId};

/// Browse the movie catalog and check purchases.
#[derive(Debug, Parser)]
#[command(name = "movie-catalog", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List movies matching the given options.
    Search(SearchArgs),
    /// Show the filter built from the given options without running it.
    Explain(SearchArgs),
    /// Try to buy a ticket or a copy of a movie.
    Buy {
        #[arg(value_enum)]
        kind: KindArg,
        id: MovieId,
    },
    /// Write the demo movies to the configured store.
    Seed,
}

#[derive(Debug, Args)]
struct SearchArgs {
    /// Only movies suitable for children.
    #[arg(long)]
    kids: bool,
    /// Minimum critic score (0 to 10).
    #[arg(long)]
    min_score: Option<f64>,
    /// Only movies already out on secondary media.
    #[arg(long)]
    secondary_media: bool,
    #[arg(long)]
    genre: Option<String>,
    /// Print JSON instead of a table.
    #[arg(long)]
    json: bool,
}

impl SearchArgs {
    fn criteria(&self) -> SearchCriteria {
        SearchCriteria {
            for_kids_only: self.kids,
            minimum_score: self.min_score,
            on_secondary_media: self.secondary_media,
            genre: self.genre.clone(),
        }
    }
}

#[derive(Debug, Copy, Clone, ValueEnum)]
enum KindArg {
    Adult,
    Child,
    SecondaryMedia,
}

impl From<KindArg> for PurchaseKind {
    fn from(value: KindArg) -> Self {
        match value {
            KindArg::Adult => PurchaseKind::AdultTicket,
            KindArg::Child => PurchaseKind::ChildTicket,
            KindArg::SecondaryMedia => PurchaseKind::SecondaryMedia,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env().context("failed to read configuration")?;
    cinema_observability::init(config.log_format);

    let secondary_media =
        AvailableOnSecondaryMedia::new().with_grace_months(config.secondary_media_grace_months)?;

    if let Command::Explain(args) = &cli.command {
        let expr = args.criteria().to_specification(&secondary_media)?.to_expression();
        println!("expression: {expr}");
        println!("json:       {}", serde_json::to_string(&expr)?);
        println!("sql:        WHERE {}", filter_sql(&expr));
        return Ok(());
    }

    let repository: Arc<dyn Repository<Movie>> = match &config.store {
        StoreConfig::InMemory => {
            tracing::info!("using in-memory demo catalog");
            Arc::new(InMemoryRepository::with_entities(demo_movies(chrono::Utc::now())?))
        }
        StoreConfig::Postgres { database_url } => {
            let postgres = PostgresMovieRepository::connect(database_url)
                .await
                .context("failed to connect to Postgres")?;
            postgres.ensure_schema().await?;
            if let Command::Seed = cli.command {
                for movie in demo_movies(chrono::Utc::now())? {
                    postgres.upsert(&movie).await?;
                }
                tracing::info!("demo movies written");
            }
            Arc::new(postgres)
        }
    };

    let catalog = MovieCatalog::new(repository, secondary_media);

    match cli.command {
        Command::Search(args) => {
            let movies = catalog.search(&args.criteria()).await?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&movies)?);
            } else {
                print_table(&movies);
            }
        }
        Command::Buy { kind, id } => {
            let outcome = catalog.buy(kind.into(), id).await?;
            println!("{}", outcome.message());
        }
        Command::Seed => {
            if config.store == StoreConfig::InMemory {
                println!("in-memory store is seeded on every run; nothing to do");
            }
        }
        Command::Explain(_) => {}
    }

    Ok(())
}

fn print_table(movies: &[Movie]) {
    if movies.is_empty() {
        println!("no movies found");
        return;
    }
    for movie in movies {
        println!(
            "{}  {:<24} {:<6} {:<10} {:>4.1}  {}",
            movie.id(),
            movie.name(),
            movie.mpaa_rating().as_str(),
            movie.genre(),
            movie.score(),
            movie.release_date().format("%Y-%m-%d"),
        );
    }
}
