/// Frame classification service diagnostics
use anyhow::Result;
use proctor_core::config::EngineConfig;
use proctor_integrations::HttpFrameClassifier;
use std::path::Path;

fn client(config_path: Option<&Path>) -> Result<HttpFrameClassifier> {
    let config = EngineConfig::load_or_default(config_path)?;
    HttpFrameClassifier::new(config.classifier, config.integrity.classifier_timeout())
}

pub async fn handle_check(config_path: Option<&Path>) -> Result<()> {
    let classifier = client(config_path)?;
    match classifier.health().await {
        Ok(()) => {
            println!("Classifier at {} is healthy", classifier.base_url());
            Ok(())
        }
        Err(e) => {
            println!("Classifier at {} is unavailable", classifier.base_url());
            println!("Sessions still run, but the cheating score will stay at 0.");
            Err(e)
        }
    }
}

pub async fn handle_summary(config_path: Option<&Path>) -> Result<()> {
    let classifier = client(config_path)?;
    let summary = classifier.session_summary().await?;
    println!("{}", summary.trim());
    Ok(())
}
