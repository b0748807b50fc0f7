use anyhow::{bail, Context};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use hanzi_core::logging;
use hanzi_core::prelude::*;
use hanzi_store::{adapt_lesson, StoreLessonRepository};
use std::path::PathBuf;

fn position_args(cmd: Command, required: bool) -> Command {
    cmd.arg(
        Arg::new("publisher")
            .long("publisher")
            .required(required)
            .help("Textbook publisher, e.g. 康軒"),
    )
    .arg(
        Arg::new("grade")
            .long("grade")
            .required(required)
            .value_parser(value_parser!(u32))
            .help("Grade, 1-based"),
    )
    .arg(
        Arg::new("semester")
            .long("semester")
            .required(required)
            .value_parser(value_parser!(u32))
            .help("Semester, 1 or 2"),
    )
    .arg(
        Arg::new("lesson")
            .long("lesson")
            .required(required)
            .value_parser(value_parser!(u32))
            .help("Lesson number, 1-based"),
    )
}

fn cli() -> Command {
    Command::new("hanzi-ledger")
        .version(hanzi_core::VERSION)
        .about("Cumulative vocabulary ledger administration")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("TOML configuration file [default: file store under ./hanzi-ledger-data]"),
        )
        .subcommand(
            Command::new("import")
                .about("Load lesson documents from a JSON array")
                .arg(
                    Arg::new("file")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("JSON file holding lesson documents"),
                ),
        )
        .subcommand(position_args(
            Command::new("query").about("Check which characters are learned").arg(
                Arg::new("text").required(true).help("Text to check"),
            ),
            true,
        ))
        .subcommand(position_args(
            Command::new("vocab").about("Print cumulative vocabulary at a position"),
            true,
        ))
        .subcommand(position_args(
            Command::new("lesson").about("Print one stored lesson"),
            true,
        ))
        .subcommand(position_args(
            Command::new("clear")
                .about("Clear cache entries, optionally for one position")
                .arg(
                    Arg::new("tier")
                        .required(true)
                        .value_parser(["cumulative", "query", "all"])
                        .help("Which cache to clear"),
                )
                .arg(
                    Arg::new("quiet")
                        .long("quiet")
                        .short('q')
                        .action(ArgAction::SetTrue)
                        .help("Suppress the removal summary"),
                ),
            false,
        ))
}

fn parse_position(args: &ArgMatches) -> anyhow::Result<Option<CurriculumPosition>> {
    let publisher = args.get_one::<String>("publisher");
    let grade = args.get_one::<u32>("grade");
    let semester = args.get_one::<u32>("semester");
    let lesson = args.get_one::<u32>("lesson");
    match (publisher, grade, semester, lesson) {
        (None, None, None, None) => Ok(None),
        (Some(p), Some(&g), Some(&s), Some(&l)) => {
            Ok(Some(CurriculumPosition::new(p.as_str(), g, s, l)?))
        }
        _ => bail!("a position needs --publisher, --grade, --semester and --lesson together"),
    }
}

fn required_position(args: &ArgMatches) -> anyhow::Result<CurriculumPosition> {
    parse_position(args)?.context("position is required")
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let matches = cli().get_matches();

    let config_path = matches.get_one::<PathBuf>("config");
    let config = LedgerConfig::load_or_default(config_path.map(PathBuf::as_path))
        .with_context(|| match config_path {
            Some(path) => format!("loading {}", path.display()),
            None => "building default configuration".to_string(),
        })?;
    logging::init(&config.log)?;
    if config.store == StoreConfig::Memory {
        tracing::warn!("memory store selected; nothing will outlive this process");
    }

    let store = config.store.open();
    tracing::debug!(backend = store.backend_tag(), "store opened");
    let service = AggregationService::from_store(store.clone(), config.cache.clone());

    match matches.subcommand() {
        Some(("import", args)) => {
            let Some(path) = args.get_one::<PathBuf>("file") else {
                bail!("missing lesson file");
            };
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            let documents: Vec<serde_json::Value> =
                serde_json::from_str(&text).context("lesson file must be a JSON array")?;

            let repository = StoreLessonRepository::new(store);
            for (index, document) in documents.into_iter().enumerate() {
                let lesson = adapt_lesson(&format!("#{index}"), document)?;
                repository.put_lesson(&lesson).await?;
            }
            let cleared = service.clear_cumulative_cache(None).await?
                + service.clear_query_cache(None).await?;
            println!("imported lessons, dropped {cleared} cached entries");
        }
        Some(("query", args)) => {
            let position = required_position(args)?;
            let text = args.get_one::<String>("text").map(String::as_str).unwrap_or_default();
            let result = service
                .query_learned_status(position.publisher(), &position, text)
                .await?;
            print_json(&result)?;
        }
        Some(("vocab", args)) => {
            let position = required_position(args)?;
            print_json(&service.cumulative_vocabulary(&position).await?)?;
        }
        Some(("lesson", args)) => {
            let position = required_position(args)?;
            match service.lesson(&position).await? {
                Some(lesson) => print_json(&lesson)?,
                None => bail!("no lesson at {position}"),
            }
        }
        Some(("clear", args)) => {
            let position = parse_position(args)?;
            let tier = args.get_one::<String>("tier").map(String::as_str).unwrap_or("all");
            let mut removed = 0;
            if matches!(tier, "cumulative" | "all") {
                removed += service.clear_cumulative_cache(position.as_ref()).await?;
            }
            if matches!(tier, "query" | "all") {
                removed += service.clear_query_cache(position.as_ref()).await?;
            }
            if !args.get_flag("quiet") {
                println!("removed {removed} entries");
            }
        }
        _ => {}
    }

    Ok(())
}
