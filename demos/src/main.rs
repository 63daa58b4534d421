use token_automata::error_handling::Result;
use token_automata::parser::PatternSchema;

use clap::{Arg, ArgAction, Command};
use log::info;

fn main() -> Result<()> {
    env_logger::init();

    let matches = Command::new("token-matcher")
        .version("0.1.0")
        .about("Tests a whitespace-separated token sequence against patterns from a schema")
        .arg(
            Arg::new("schema")
                .help("Path to the pattern schema file")
                .required(true)
                .value_name("SCHEMA_FILE"),
        )
        .arg(
            Arg::new("all")
                .long("all")
                .help("Test the tokens against every pattern in the schema")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("pattern")
                .help("Name of the pattern to test against")
                .required_unless_present("all")
                .value_name("PATTERN"),
        )
        .arg(
            Arg::new("tokens")
                .help("Tokens of the input sequence")
                .num_args(0..)
                .value_name("TOKENS"),
        )
        .get_matches();

    let schema_path: &String = matches.get_one("schema").expect("no schema found");
    let schema = PatternSchema::parse_from_file(schema_path)?;
    info!(
        "loaded {} patterns from {}",
        schema.get_patterns().len(),
        schema_path
    );

    let test_all = matches.get_flag("all");
    let mut tokens: Vec<String> = matches
        .get_many::<String>("tokens")
        .map(|tokens| tokens.cloned().collect())
        .unwrap_or_default();

    if test_all {
        // With --all there is no pattern argument, so the first positional is a token.
        if let Some(first) = matches.get_one::<String>("pattern") {
            tokens.insert(0, first.clone());
        }
        for (name, dfa) in schema.build_all() {
            println!("{}: {}", name, verdict(dfa.test(&tokens)));
        }
        return Ok(());
    }

    let pattern: &String = matches.get_one("pattern").expect("no pattern found");
    match schema.build(pattern) {
        Some(dfa) => {
            info!("pattern {} has {} DFA states", pattern, dfa.get_num_states());
            println!("{}", verdict(dfa.test(&tokens)));
        }
        None => {
            eprintln!("unknown pattern `{}`", pattern);
            std::process::exit(2);
        }
    }

    Ok(())
}

fn verdict(accepted: bool) -> &'static str {
    if accepted {
        "accepted"
    } else {
        "rejected"
    }
}
