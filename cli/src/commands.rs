pub mod build;
pub mod check;
pub mod deploy;
use clap::Subcommand;

#[derive(Subcommand)]
pub enum Commands {
    /// Render CloudFormation templates of the blueprints
    Build(build::BuildCommand),

    /// Verify that the stacks are linked through SSM parameters
    Check(check::CheckCommand),

    /// Deploy the stacks in order and wait for each to complete
    Deploy(deploy::DeployCommand),
}
