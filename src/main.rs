// File: main.rs
// SPDX-License-Identifier: MIT OR Apache-2.0

use clap::Parser;
use h1check::cases;
use h1check::cli::Cli;
use h1check::report::{ReportFormat, ReportGenerator};
use h1check::runner::Runner;
use h1check::server::ServerUnderTest;
use log::{error, LevelFilter};
use std::str::FromStr;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let level = LevelFilter::from_str(&cli.log_level).unwrap_or(LevelFilter::Warn);
    let _ = simple_logger::SimpleLogger::new().with_level(level).init();
    if cli.no_color {
        colored::control::set_override(false);
    }

    let config = Arc::new(cli.to_config());

    let mut runner = Runner::new(Arc::clone(&config));
    match &cli.case {
        Some(name) => {
            let mut found = false;
            for case in cases::all_cases() {
                if case.name == name {
                    runner.register(case);
                    found = true;
                }
            }
            if !found {
                error!("unknown case: {}", name);
                eprintln!("unknown case: {}", name);
                std::process::exit(2);
            }
        }
        None => runner.register_all(cases::all_cases()),
    }

    if cli.list {
        for name in runner.case_names() {
            println!("{}", name);
        }
        return;
    }

    let server = match config.server_cmd() {
        Some(cmd) => {
            match ServerUnderTest::start(
                cmd,
                config.server_config(),
                config.host(),
                config.port(),
                config.startup_grace(),
            )
            .await
            {
                Ok(server) => Some(server),
                Err(e) => {
                    error!("could not start server under test: {}", e);
                    eprintln!("could not start server under test: {}", e);
                    std::process::exit(2);
                }
            }
        }
        None => None,
    };

    let report = tokio::select! {
        report = runner.run() => report,
        _ = tokio::signal::ctrl_c() => {
            eprintln!("interrupted, tearing down");
            if let Some(server) = server {
                server.stop(config.shutdown_wait()).await;
            }
            std::process::exit(130);
        }
    };

    if let Some(server) = server {
        server.stop(config.shutdown_wait()).await;
    }

    let format = match cli.format.as_str() {
        "json" => ReportFormat::Json,
        _ => ReportFormat::Text,
    };
    let mut stdout = std::io::stdout();
    if let Err(e) = ReportGenerator::render(&report, format, &mut stdout) {
        error!("failed to render report: {}", e);
    }
    if let Some(path) = &cli.output {
        if let Err(e) =
            ReportGenerator::write_file(&report, &path.to_string_lossy(), ReportFormat::Json)
        {
            error!("failed to write report file: {}", e);
        }
    }

    std::process::exit(report.exit_code());
}
