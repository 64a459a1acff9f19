use std::path::PathBuf;

use structopt::StructOpt;

#[derive(StructOpt)]
pub struct Options {
    /// Path of the schema config file
    #[structopt(long, default_value = "schema.toml")]
    pub config: PathBuf,

    #[structopt(subcommand)]
    pub command: Command,
}

#[derive(StructOpt)]
pub enum Command {
    /// Compile the schema config into the cache file
    Cache,

    /// Remove the cache file
    Clear,

    /// Print the effective rules of a field
    Rules {
        /// Field path, e.g. `mutation.createPost`
        field: String,

        /// Submitted arguments as a JSON object
        #[structopt(long)]
        args: Option<String>,
    },

    /// Validate arguments against the rules of a field
    Validate {
        /// Field path, e.g. `mutation.createPost`
        field: String,

        /// Submitted arguments as a JSON object
        #[structopt(long)]
        args: String,

        /// GraphQL document used to locate the error
        #[structopt(long)]
        query: Option<String>,
    },
}
