use std::{path::PathBuf, process, sync::Arc, time::Duration};

use anyhow::{Result, bail};
use clap::{Args, CommandFactory, FromArgMatches, Parser, Subcommand};
use hemicycle_i18n::{
    Catalogs, I18nConfig, I18nError, Layout, Origin, Params, Translation, Translator,
    cli as cli_i18n, default_root,
    locale::detect_default_locale,
    translator::{render_error, translate},
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "hemicycle-i18n", version, about = "i18n:cli.about")]
struct Cli {
    #[arg(long, global = true, value_name = "DIR", help = "i18n:cli.root_help")]
    root: Option<PathBuf>,

    #[arg(long, global = true, value_name = "DIR", help = "i18n:cli.catalogs_help")]
    catalogs: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    #[command(about = "i18n:cli.lookup.about")]
    Lookup(LookupArgs),

    #[command(about = "i18n:cli.locale.about")]
    Locale {
        #[command(subcommand)]
        command: LocaleCommand,
    },

    #[command(about = "i18n:cli.keys.about")]
    Keys(KeysArgs),

    #[command(about = "i18n:cli.coverage.about")]
    Coverage,
}

#[derive(Subcommand, Debug)]
enum LocaleCommand {
    #[command(about = "i18n:cli.locale.get")]
    Get,
    #[command(about = "i18n:cli.locale.set")]
    Set(LocaleSetArgs),
    #[command(about = "i18n:cli.locale.watch")]
    Watch,
}

#[derive(Args, Debug)]
struct LookupArgs {
    #[arg(value_name = "KEY", help = "i18n:cli.lookup.key")]
    key: String,

    #[arg(long, value_name = "CODE", help = "i18n:cli.lookup.locale")]
    locale: Option<String>,

    #[arg(long = "param", value_name = "NAME=VALUE", help = "i18n:cli.lookup.param")]
    params: Vec<String>,
}

#[derive(Args, Debug)]
struct LocaleSetArgs {
    #[arg(value_name = "CODE", help = "i18n:cli.locale.code")]
    code: String,
}

#[derive(Args, Debug)]
struct KeysArgs {
    #[arg(long, value_name = "CODE", help = "i18n:cli.keys.locale")]
    locale: Option<String>,
}

/// Everything a command needs from one opened origin.
struct Session {
    origin: Origin,
    translator: Translator,
    watch_interval: Duration,
}

#[tokio::main]
async fn main() {
    init_tracing();

    let bundled = match Catalogs::bundled() {
        Ok(catalogs) => catalogs,
        Err(err) => {
            eprintln!("{err:#}");
            process::exit(1);
        }
    };
    let help_locale = detect_default_locale(&bundled.locales());
    let command = cli_i18n::localize_command(Cli::command(), &bundled, &help_locale);

    let mut matches = command.get_matches();
    let cli = Cli::from_arg_matches_mut(&mut matches).unwrap_or_else(|err| err.exit());

    let session = match open_session(cli.root.clone(), cli.catalogs.clone(), bundled.clone()) {
        Ok(session) => session,
        Err(err) => {
            let prefix = translate(&bundled, &help_locale, "errors.prefix", &Params::new());
            eprintln!(
                "{} {}",
                prefix.as_str().unwrap_or_default(),
                render_error(&bundled, &help_locale, &err)
            );
            process::exit(1);
        }
    };

    if let Err(err) = run(&session, cli.command).await {
        let translator = &session.translator;
        eprintln!("{} {}", translator.t("errors.prefix"), translator.render_error(&err));
        process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("hemicycle_i18n=info"));

    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn open_session(
    root: Option<PathBuf>,
    catalogs_dir: Option<PathBuf>,
    bundled: Catalogs,
) -> Result<Session> {
    let root = match root {
        Some(root) => root,
        None => default_root()?,
    };
    let config = I18nConfig::from_env_with_root(root);
    let layout = Layout::new(config.root.clone());

    // --catalogs wins over <root>/catalogs, which wins over the bundled set
    let catalogs = match catalogs_dir {
        Some(dir) => Catalogs::from_dir(&dir)?,
        None if layout.catalogs_dir().is_dir() => Catalogs::from_dir(layout.catalogs_dir())?,
        None => bundled,
    };
    let default_locale = config.resolve_default_locale(&catalogs.locales());

    let origin = Origin::open(&layout, default_locale)?;
    let translator = Translator::new(Arc::new(catalogs), origin.context());
    Ok(Session { origin, translator, watch_interval: config.watch_interval })
}

async fn run(session: &Session, command: Command) -> Result<()> {
    let translator = &session.translator;
    match command {
        Command::Lookup(args) => handle_lookup(translator, args),
        Command::Locale { command } => match command {
            LocaleCommand::Get => {
                println!("{}", translator.locale());
                Ok(())
            }
            LocaleCommand::Set(args) => {
                translator.change_language(&args.code)?;
                let params = Params::new().with("locale", &args.code);
                println!("{}", translator.t_with("cli.locale_changed", &params));
                Ok(())
            }
            LocaleCommand::Watch => watch_locale(session).await,
        },
        Command::Keys(args) => {
            let keys = match args.locale {
                Some(locale) => {
                    ensure_locale(translator, &locale)?;
                    translator.catalogs().leaf_keys(&locale)
                }
                None => translator.catalogs().all_keys(),
            };
            for key in keys {
                println!("{key}");
            }
            Ok(())
        }
        Command::Coverage => {
            print_coverage(translator);
            Ok(())
        }
    }
}

fn handle_lookup(translator: &Translator, args: LookupArgs) -> Result<()> {
    let mut params = Params::new();
    for raw in &args.params {
        let Some((name, value)) = raw.split_once('=') else {
            bail!(translator.t("cli.param_format"));
        };
        let name = name.trim();
        if name.is_empty() {
            bail!(translator.t("cli.param_format"));
        }
        params.insert(name, value);
    }

    let locale = match args.locale {
        Some(locale) => {
            ensure_locale(translator, &locale)?;
            locale
        }
        None => translator.locale(),
    };

    match translate(translator.catalogs(), &locale, &args.key, &params) {
        Translation::Text(text) => println!("{text}"),
        Translation::Subtree(children) => {
            for segment in children.keys() {
                println!("{}.{segment}", args.key);
            }
        }
    }
    Ok(())
}

async fn watch_locale(session: &Session) -> Result<()> {
    let translator = &session.translator;
    let mut changes = translator.watch();
    let watcher = session.origin.spawn_watcher(session.watch_interval);
    info!(path = %session.origin.path().display(), "watching locale preference");

    println!("{}", translator.locale());
    loop {
        tokio::select! {
            changed = changes.changed() => {
                if changed.is_err() {
                    break;
                }
                let locale = changes.borrow_and_update().clone();
                println!("{locale}");
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    watcher.abort();
    Ok(())
}

fn print_coverage(translator: &Translator) {
    let report = translator.catalogs().coverage_report();
    for coverage in report.locales {
        let params = Params::new()
            .with("locale", &coverage.locale)
            .with("present", coverage.present)
            .with("total", report.total_keys)
            .with("percent", format!("{:.1}", coverage.coverage_percent));
        println!("{}", translator.t_with("cli.coverage.header", &params));
        for key in &coverage.missing {
            println!("{}", translator.t_with("cli.coverage.missing", &Params::new().with("key", key)));
        }
    }
}

fn ensure_locale(translator: &Translator, locale: &str) -> Result<()> {
    if !translator.available_locales().contains(&locale) {
        return Err(I18nError::UnknownLocale { locale: locale.to_string() }.into());
    }
    Ok(())
}
