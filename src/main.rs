//! Main entry point for the rbaseline application.

use clap::Parser;
use rbaseline::{
    build_manager, cli::Args, display_collection_results, plan_collection, read_project_config,
    CollectionPlan, Environment, HookRegistry, Manifest, PlanOptions, Result,
};

fn run(args: &Args) -> Result<CollectionPlan> {
    let project = read_project_config(&args.rootdir)?;

    let mut manifest = Manifest::default();
    for path in args.manifest_paths()? {
        manifest.merge(Manifest::load(&path)?);
    }

    let options = PlanOptions {
        env: Environment::new(args.env.as_str()),
        htmlpath: args.htmlpath.clone(),
        invocation_args: args.pytest_args.clone(),
    };
    let manager = build_manager(options, &project, &manifest, &mut HookRegistry::new())?;
    Ok(plan_collection(&manifest, &manager))
}

pub fn main() {
    let args = Args::parse();

    let plan = match run(&args) {
        Ok(plan) => plan,
        Err(e) => {
            eprintln!("FATAL: {e}");
            std::process::exit(1);
        }
    };

    if args.json {
        match serde_json::to_string_pretty(&plan) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Failed to serialize plan: {e}");
                std::process::exit(1);
            }
        }
    } else {
        display_collection_results(&plan);
    }

    std::process::exit(plan.exit_code());
}
