use std::env;
use std::fs;
use std::process::ExitCode;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use idset::construct::RecordSet;
use idset::dali;
use idset::persist::Persistor;
use idset::settings::Settings;
use idset::Result;

fn run(settings: &Settings) -> Result<()> {
    let mut persistor = Persistor::new(settings.persistence())?;

    for path in &settings.import.dali {
        let set = dali::read_report(path)?;
        let name = set.name().unwrap_or(dali::DATABASE).to_string();
        persistor.persist_set(&name, &set)?;
        info!(%path, %name, records = set.len(), "imported Dali report");
    }

    if let Some(operation) = &settings.operation {
        let inputs = operation
            .inputs
            .iter()
            .map(|name| persistor.restore_set(name))
            .collect::<Result<Vec<RecordSet>>>()?;
        let inputs: Vec<&RecordSet> = inputs.iter().collect();
        let mut output = operation.parameters.apply(&inputs)?;
        output.set_name(&operation.output);
        persistor.persist_set(&operation.output, &output)?;
        if let Some(export) = &operation.export {
            fs::write(export, serde_json::to_string_pretty(&output)?)?;
            info!(%export, "exported record set");
        }
    }

    for stored in persistor.stored_sets()? {
        println!(
            "{}\t{}\t{}",
            stored.name,
            stored.records,
            stored.created.to_rfc3339()
        );
    }
    Ok(())
}

fn main() -> ExitCode {
    let path = env::args().nth(1);
    let settings = match Settings::load(path.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.log_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match run(&settings) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "idset failed");
            ExitCode::FAILURE
        }
    }
}
