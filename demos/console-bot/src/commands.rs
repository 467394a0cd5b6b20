//! The demo commands.

use std::hash::{BuildHasher, RandomState};
use std::ops::RangeInclusive;

use herald::prelude::*;
use serde_json::json;

/// Registers every demo command on the runtime.
pub fn register(runtime: &HeraldRuntime) {
    runtime.add_command(
        "say",
        CommandBuilder::new()
            .boolean("loud")
            .alias("loud", "l")
            .handler(say)
            .build(),
    );

    runtime.add_command("sum", CommandBuilder::new().handler(sum).build());

    runtime.add_command(
        "roll",
        CommandBuilder::new()
            .number("sides")
            .number("times")
            .alias("sides", "s")
            .alias("times", "n")
            .default("sides", 6)
            .default("times", 1)
            .count("v")
            .handler(roll)
            .build(),
    );

    runtime.add_command(
        "tags",
        CommandBuilder::new()
            .array("tag")
            .alias("tag", "t")
            .string("sep")
            .default("sep", ", ")
            .handler(tags)
            .build(),
    );

    runtime.add_command("flags", CommandBuilder::new().handler(flags).build());

    runtime.add_command("boom", CommandBuilder::new().handler(boom).build());

    // Registered without a handler on purpose: dispatching it replies with
    // instructions instead of crashing.
    runtime.add_command("broken", CommandBuilder::new().build());
}

/// `say [--loud|-l] <text...>`
async fn say(ctx: CommandContext) -> String {
    let text = ctx.args().join(" ");
    if ctx.flags().boolean("loud") {
        text.to_uppercase()
    } else {
        text
    }
}

/// `sum <number...>`
async fn sum(ctx: CommandContext) -> Result<String, String> {
    if ctx.args().is_empty() {
        return Err("nothing to add".to_string());
    }
    let total: f64 = ctx
        .args()
        .iter()
        .map(|a| {
            a.parse::<f64>()
                .map_err(|_| format!("`{a}` is not a number"))
        })
        .sum::<Result<_, _>>()?;
    Ok(total.to_string())
}

/// `roll [--sides|-s N] [--times|-n N] [-v...]`
async fn roll(ctx: CommandContext) -> Result<String, String> {
    let flags = ctx.flags();
    let sides = whole(flags.number("sides"), "sides", 1..=1000)?;
    let times = whole(flags.number("times"), "times", 1..=100)?;
    let verbosity = flags.count("v");

    let state = RandomState::new();
    let rolls: Vec<u64> = (0..times)
        .map(|i| state.hash_one((ctx.message().id.as_str(), i)) % sides + 1)
        .collect();
    let total: u64 = rolls.iter().sum();

    Ok(match verbosity {
        0 => total.to_string(),
        1 => format!("{times}d{sides}: {total}"),
        _ => format!("{times}d{sides}: {rolls:?} = {total}"),
    })
}

fn whole(value: Option<f64>, name: &str, range: RangeInclusive<u64>) -> Result<u64, String> {
    let value = value.ok_or_else(|| format!("--{name} must be a number"))?;
    if value.fract() != 0.0 || value < 0.0 || !range.contains(&(value as u64)) {
        return Err(format!(
            "--{name} must be a whole number between {} and {}",
            range.start(),
            range.end()
        ));
    }
    Ok(value as u64)
}

/// `tags [--tag|-t T]... [--sep S]`
async fn tags(ctx: CommandContext) -> Option<String> {
    let flags = ctx.flags();
    let tags: Vec<String> = flags.list("tag").iter().map(ToString::to_string).collect();
    if tags.is_empty() {
        return None;
    }
    Some(tags.join(flags.string("sep").unwrap_or(", ")))
}

/// `boom` - panics; the router answers with the panic message.
async fn boom(_ctx: CommandContext) {
    panic!("the boom command always explodes");
}

/// `flags ...` - echoes whatever was parsed.
async fn flags(ctx: CommandContext) -> Result<(), String> {
    let parsed = json!({
        "command": ctx.command(),
        "args": ctx.args(),
        "flags": ctx.flags(),
    });
    let text = serde_json::to_string_pretty(&parsed).map_err(|e| e.to_string())?;
    ctx.reply_with(&text, ReplyOptions::code("json"))
        .await
        .map_err(|e| e.to_string())
}
