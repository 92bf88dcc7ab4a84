use std::io;
use tracing::Level;
use tracing_appender::rolling;
use tracing_subscriber::filter::FilterFn;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

pub fn configure_logging() {
    // Only let tokenizers errors through, the rest is load-time noise
    let custom_filter = FilterFn::new(|metadata| {
        !(metadata.level() != &Level::ERROR && metadata.target().starts_with("tokenizers"))
    });

    // Stdout log configuration
    let stdout_log = fmt::layer()
        .with_writer(io::stdout)
        .with_target(false)
        .with_filter(EnvFilter::new(
            "info,pipeline=info,ner_engine=info,ner_output=info,reqwest=warn,hyper=warn",
        ))
        .with_filter(custom_filter);

    // File log configuration
    let file_appender = rolling::daily("logs", "ner.log");
    let file_log = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false)
        .with_filter(EnvFilter::new("info,pipeline=debug,ner_engine=debug"));

    tracing_subscriber::Registry::default()
        .with(stdout_log)
        .with(file_log)
        .init();
}
