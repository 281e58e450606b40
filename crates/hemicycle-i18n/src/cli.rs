//! Localized help text for clap commands.
//!
//! Help strings are written as `i18n:<key>` placeholders in the clap derive
//! attributes and swapped for catalog text before parsing.

use clap::{Command, builder::Arg};

use crate::{catalog::Catalogs, interpolate::Params, translator::translate};

const PLACEHOLDER_PREFIX: &str = "i18n:";

/// Catalog text for an `i18n:<key>` placeholder, or `None` for plain text.
pub fn translate_placeholder(catalogs: &Catalogs, locale: &str, candidate: &str) -> Option<String> {
    let key = candidate.trim().strip_prefix(PLACEHOLDER_PREFIX)?;
    translate(catalogs, locale, key, &Params::new()).as_str().map(str::to_string)
}

pub fn localize_command(mut command: Command, catalogs: &Catalogs, locale: &str) -> Command {
    if let Some(about) = command
        .get_about()
        .and_then(|styled| translate_placeholder(catalogs, locale, &styled.to_string()))
    {
        command = command.about(about);
    }
    if let Some(long_about) = command
        .get_long_about()
        .and_then(|styled| translate_placeholder(catalogs, locale, &styled.to_string()))
    {
        command = command.long_about(long_about);
    }

    command = command.mut_args(|arg| localize_arg(arg, catalogs, locale));
    command = command.mut_subcommands(|sub| localize_command(sub, catalogs, locale));
    command
}

fn localize_arg(mut arg: Arg, catalogs: &Catalogs, locale: &str) -> Arg {
    if let Some(help) = arg
        .get_help()
        .and_then(|styled| translate_placeholder(catalogs, locale, &styled.to_string()))
    {
        arg = arg.help(help);
    }

    if let Some(long_help) = arg
        .get_long_help()
        .and_then(|styled| translate_placeholder(catalogs, locale, &styled.to_string()))
    {
        arg = arg.long_help(long_help);
    }

    arg
}
