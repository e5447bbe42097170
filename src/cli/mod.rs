// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! CLI definitions for the mojigram command-line interface.
//!
//! `build` turns documents into a term dictionary, `lookup`/`ord` query it
//! in both directions, `list` walks it in sorted order with an optional
//! starting seek, `inspect` dumps the file header, and `analyze` shows what
//! the CJK analysis chain does to a piece of text.

pub mod display;

use clap::{Parser, Subcommand};

use mojigram::ScriptSet;

#[derive(Parser)]
#[command(
    name = "mojigram",
    about = "CJK bigram analysis and FST term dictionary tools",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build a term dictionary from a text file (one document per line)
    Build {
        /// Input text file, UTF-8, one document per line
        #[arg(short, long)]
        input: String,

        /// Output dictionary file
        #[arg(short, long)]
        output: String,

        /// Also index every CJK codepoint as a unigram
        #[arg(long)]
        unigrams: bool,

        /// Scripts to bigram, comma-separated (han,hiragana,katakana,hangul)
        #[arg(long)]
        scripts: Option<String>,
    },

    /// Look up a term's ordinal
    Lookup {
        /// Path to dictionary file
        file: String,
        term: String,
    },

    /// Look up the term with a given ordinal (reverse lookup)
    Ord {
        /// Path to dictionary file
        file: String,
        ord: u64,
    },

    /// List terms in sorted order
    List {
        /// Path to dictionary file
        file: String,

        /// Start at the smallest term >= this one
        #[arg(long)]
        from: Option<String>,

        /// Maximum number of terms to print (0 = all)
        #[arg(long, default_value = "20")]
        limit: usize,
    },

    /// Show dictionary file structure
    Inspect {
        /// Path to dictionary file
        file: String,

        /// Emit machine-readable JSON instead of a report
        #[arg(long)]
        json: bool,
    },

    /// Run the analysis chain over text and print the tokens
    Analyze {
        text: String,

        /// Emit every CJK position as both unigram and bigram synonyms
        #[arg(long)]
        unigrams: bool,

        /// Scripts to bigram, comma-separated (han,hiragana,katakana,hangul)
        #[arg(long)]
        scripts: Option<String>,
    },
}

/// Parse a `--scripts han,katakana` style list.
pub fn parse_scripts(spec: &str) -> Result<ScriptSet, String> {
    let mut set = ScriptSet::empty();
    for part in spec.split(',') {
        let part = part.trim();
        set = set
            | match part.to_ascii_lowercase().as_str() {
                "han" => ScriptSet::HAN,
                "hiragana" => ScriptSet::HIRAGANA,
                "katakana" => ScriptSet::KATAKANA,
                "hangul" => ScriptSet::HANGUL,
                "" => continue,
                other => return Err(format!("unknown script: {}", other)),
            };
    }
    Ok(set)
}
