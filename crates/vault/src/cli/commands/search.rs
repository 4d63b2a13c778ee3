//! Implementation of `vault search`.

use std::process::ExitCode;

use vault_index::{Corpus, QueryPlan};

use crate::cli::{
    args::SearchCommand,
    context::CommandContext,
    output::{SearchReport, dim, subheader, warning},
};

/// Ranks the catalog against a query and prints the matches.
pub fn run(ctx: &CommandContext, cmd: &SearchCommand) -> ExitCode {
    let settings = ctx.search_settings(cmd.strategy);
    let threshold = cmd.threshold.unwrap_or(settings.threshold);
    let limit = cmd.limit.unwrap_or(settings.limit);
    let query = cmd.queries.join(" ");

    let corpus = match ctx.load_corpus(&cmd.categories.categories) {
        Ok(corpus) => corpus,
        Err(code) => return code,
    };

    if cmd.explain {
        print_explain(&query, &corpus);
        return ExitCode::SUCCESS;
    }

    let strategy = settings.strategy;
    let service = ctx.service(settings);
    let hits = match service.search(None, &corpus, &query, threshold) {
        Ok(hits) => hits,
        Err(e) => {
            eprintln!("error: search failed: {e}");
            return ExitCode::FAILURE;
        }
    };

    let report = SearchReport {
        query: &query,
        threshold,
        strategy: strategy.name(),
        hits: &hits,
        limit,
    };
    if cmd.json {
        match report.to_json(&corpus) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("error: failed to serialize results: {e}");
                return ExitCode::FAILURE;
            }
        }
    } else {
        println!("{}", report.to_text(&corpus));
    }
    ExitCode::SUCCESS
}

/// Prints how a query is interpreted against the corpus.
fn print_explain(query: &str, corpus: &Corpus) {
    let plan = QueryPlan::build(query, corpus.field_names());

    println!("{}", subheader("Query:"));
    println!("   {query}");
    println!();

    if let Some(error) = plan.fallback() {
        println!("{}", subheader("Parse:"));
        println!("   {}", warning("fallback to plain words"));
        for line in error.to_string().lines() {
            println!("   {}", dim(line));
        }
        println!();
    } else if let Some(expr) = plan.expr() {
        println!("{}", subheader("Parsed AST:"));
        for line in expr.to_string().lines() {
            println!("   {line}");
        }
        println!();
    } else {
        println!("{}", dim("(empty query)"));
        println!();
    }

    println!("{}", subheader("Weighted terms:"));
    if plan.terms().is_empty() {
        println!("   {}", dim("(none, results are unscored)"));
    } else {
        println!("   {}", plan.terms().join(" "));
    }
    println!();

    println!("{}", subheader("Constraints:"));
    if plan.constraints().is_empty() {
        println!("   {}", dim("(none)"));
    } else {
        for constraint in plan.constraints() {
            for line in constraint.to_string().lines() {
                println!("   {line}");
            }
        }
    }
    println!();

    println!("{}", subheader("Fields:"));
    println!("   {}", corpus.field_names().join(", "));
}
