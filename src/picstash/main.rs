use clap::Parser;
use picstash::api::PicstashApi;
use picstash::commands::config::ConfigAction;
use picstash::config::PicstashConfig;
use picstash::error::Result;
use picstash::init::{discover_paths, initialize};
use picstash::logging::{init_logging, LogLevel};
use picstash::picker::PathPicker;
use picstash::resolver::LocalResolver;
use picstash::viewer::CommandViewer;
use std::path::PathBuf;

mod args;
mod cli;
use args::{Cli, Commands};
use cli::print::{print_config, print_locators, print_messages, print_paths};

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

struct AppContext {
    api: PicstashApi<LocalResolver>,
    config: PicstashConfig,
}

impl AppContext {
    fn viewer(&self) -> CommandViewer {
        CommandViewer::new(
            self.config.viewer.as_deref(),
            self.api.flow().resolver().clone(),
        )
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(LogLevel::from_verbosity(cli.verbose));

    let init = initialize(discover_paths()?)?;
    let mut ctx = AppContext {
        api: init.api,
        config: init.config,
    };

    match cli.command {
        Some(Commands::Pick { path }) => handle_pick(&mut ctx, path),
        Some(Commands::Save) => handle_save(&mut ctx),
        Some(Commands::View) => handle_view(&mut ctx),
        Some(Commands::Run { path }) => handle_run(&mut ctx, path),
        Some(Commands::Status) | None => handle_status(&ctx),
        Some(Commands::Paths) => handle_paths(&ctx),
        Some(Commands::Clean) => handle_clean(&ctx),
        Some(Commands::Config { key, value }) => handle_config(&ctx, key, value),
    }
}

fn handle_pick(ctx: &mut AppContext, path: PathBuf) -> Result<()> {
    let mut picker = PathPicker::new(Some(path));
    let result = ctx.api.pick(&mut picker)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_save(ctx: &mut AppContext) -> Result<()> {
    let result = ctx.api.save()?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_view(ctx: &mut AppContext) -> Result<()> {
    let mut viewer = ctx.viewer();
    let result = ctx.api.view(&mut viewer)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_run(ctx: &mut AppContext, path: PathBuf) -> Result<()> {
    let mut picker = PathPicker::new(Some(path));
    let mut viewer = ctx.viewer();
    let result = ctx.api.run(&mut picker, &mut viewer)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_status(ctx: &AppContext) -> Result<()> {
    let result = ctx.api.status()?;
    print_messages(&result.messages);
    print_locators(&result.locators);
    Ok(())
}

fn handle_paths(ctx: &AppContext) -> Result<()> {
    let result = ctx.api.list_paths()?;
    print_paths(&result.paths);
    Ok(())
}

fn handle_clean(ctx: &AppContext) -> Result<()> {
    let result = ctx.api.clean()?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_config(ctx: &AppContext, key: Option<String>, value: Option<String>) -> Result<()> {
    let shown = key.clone();
    let action = match (key, value) {
        (None, _) => ConfigAction::ShowAll,
        (Some(k), None) => ConfigAction::ShowKey(k),
        (Some(k), Some(v)) => ConfigAction::Set(k, v),
    };
    let setting = matches!(action, ConfigAction::Set(..));

    let result = ctx.api.config(action)?;
    print_messages(&result.messages);
    if !setting {
        if let Some(config) = &result.config {
            print_config(config, shown.as_deref());
        }
    }
    Ok(())
}
