use crate::{
    cli::args::{ParseArgs, ServeArgs, ViewMode, STDIN_MARKER},
    core::{
        session::ExportFile,
        AppConfig, ConfigLoader, ConfigValidator, DefaultErrorReporter, DisplayMode,
        ErrorReporter, NormalizedResult, Normalizer, SessionState,
    },
    server, Result,
};
use anyhow::{anyhow, Context};
use std::{
    env, fs,
    io::{self, Read},
    path::{Path, PathBuf},
};

/// Load `--config` when given, else `./scsource.toml`; env overrides apply to both.
fn load_config(explicit: Option<&Path>) -> Result<AppConfig> {
    let config = match explicit {
        Some(path) => {
            if !path.exists() {
                return Err(anyhow!("config file {} does not exist", path.display()));
            }
            ConfigLoader::load(path)?
        }
        None => {
            let cwd = env::current_dir().context("failed to resolve current directory")?;
            ConfigLoader::load_from_dir(&cwd)?
        }
    };
    ConfigValidator::validate(&config)?;
    Ok(config)
}

fn read_input(args: &ParseArgs) -> Result<String> {
    if let Some(path) = &args.file {
        return fs::read_to_string(path)
            .with_context(|| format!("failed to read input file {}", path.display()));
    }
    match args.input.as_deref() {
        Some(STDIN_MARKER) => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("failed to read standard input")?;
            Ok(buffer)
        }
        Some(input) => Ok(input.to_string()),
        None => Err(anyhow!("no input provided; pass INPUT, `-`, or --file")),
    }
}

/// Classify and normalize one input, print the chosen view, and optionally export it.
///
/// A degraded result is still a successful run: its diagnostic goes to stderr.
pub async fn parse(args: ParseArgs) -> Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    if args.direct {
        config.fetcher.direct_first = true;
    }
    let format = args.format.unwrap_or(config.output.default_format);

    let normalizer = Normalizer::new(&config)?;
    let mut session = SessionState::new(format);
    session.set_input(read_input(&args)?);
    session.submit(&normalizer).await?;

    let result = session
        .result()
        .ok_or_else(|| anyhow!("normalization produced no result"))?;
    report_diagnostic(result);

    match args.view {
        ViewMode::Json => {
            let rendered = session
                .render()
                .ok_or_else(|| anyhow!(render_failure(&session)))?;
            println!("{}", rendered);
        }
        ViewMode::Details => {
            if session.display_mode() != DisplayMode::Details {
                session.toggle_display_mode();
            }
            let rendered = session
                .render()
                .ok_or_else(|| anyhow!(render_failure(&session)))?;
            print!("{}", rendered);
        }
        ViewMode::Summary => {
            let summary = session
                .summary()
                .ok_or_else(|| anyhow!("normalization produced no result"))?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }

    if let Some(output) = &args.output {
        let export = session.download()?;
        let path = write_export(output, &export)?;
        tracing::info!("wrote {} export to {}", format, path.display());
        eprintln!("Saved {}", path.display());
    }

    Ok(())
}

fn render_failure(session: &SessionState) -> String {
    session
        .render_error()
        .unwrap_or("failed to render result")
        .to_string()
}

fn report_diagnostic(result: &NormalizedResult) {
    if let Some(diagnostic) = &result.diagnostic {
        DefaultErrorReporter.report_diagnostic(diagnostic);
    }
}

/// Write an export to `output`; a directory gets the export's generated file name.
fn write_export(output: &Path, export: &ExportFile) -> Result<PathBuf> {
    let path = if output.is_dir() {
        output.join(&export.file_name)
    } else {
        output.to_path_buf()
    };
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
    }
    fs::write(&path, &export.content)
        .with_context(|| format!("failed to write export to {}", path.display()))?;
    Ok(path)
}

/// Run the extraction service until it terminates.
pub async fn serve(args: ServeArgs) -> Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(bind) = args.bind {
        config.server.bind = bind;
    }
    if args.no_cors {
        config.server.enable_cors = false;
    }
    ConfigValidator::validate(&config)?;

    tracing::info!("starting extraction service on {}", config.server.bind);
    server::serve(&config).await.map_err(|e| {
        DefaultErrorReporter.report_error(&e);
        anyhow!("extraction service failed: {}", e.message)
    })
}
