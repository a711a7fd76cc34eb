use aws_config::{BehaviorVersion, Region};
use aws_sdk_cloudformation::error::SdkError;
use aws_sdk_cloudformation::types::Capability;
use eyre::{ContextCompat, WrapErr};
use std::fmt::Display;
use std::time::Duration;

/// How often to ask CloudFormation for the stack status
const POLL_INTERVAL: Duration = Duration::from_secs(5);

/// What happened to the stack after submitting the template
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Provision {
    Created,
    Updated,
    Unchanged,
}

impl Display for Provision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let str = match self {
            Provision::Created => "created",
            Provision::Updated => "updated",
            Provision::Unchanged => "unchanged",
        };

        write!(f, "{}", str)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Status {
    InProgress,
    Complete,

    /// Stack status and the reason reported by CloudFormation
    Failed(String),
}

impl Status {
    /// Map a CloudFormation stack status onto the deployment outcome
    ///
    /// A finished rollback is a failure, the template was not applied.
    pub(crate) fn from_stack_status(status: &str, reason: Option<&str>) -> Self {
        if status.ends_with("_IN_PROGRESS") {
            return Status::InProgress;
        }

        match status {
            "CREATE_COMPLETE" | "UPDATE_COMPLETE" | "IMPORT_COMPLETE" => Status::Complete,
            _ => Status::Failed(match reason {
                Some(reason) => format!("{status}: {reason}"),
                None => status.to_string(),
            }),
        }
    }
}

/// CloudFormation stack of a single blueprint
pub(crate) struct Stack {
    client: aws_sdk_cloudformation::Client,
    pub(crate) name: String,
}

impl Stack {
    pub(crate) async fn new(name: &str, region: Option<&str>) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());

        if let Some(region) = region {
            loader = loader.region(Region::new(region.to_string()));
        }

        let config = loader.load().await;

        Stack {
            client: aws_sdk_cloudformation::Client::new(&config),
            name: name.to_string(),
        }
    }

    /// Check if the stack already exists
    async fn is_exists(&self) -> eyre::Result<bool> {
        let result = self
            .client
            .describe_stacks()
            .stack_name(&self.name)
            .send()
            .await;

        if let Err(e) = &result {
            if let SdkError::ServiceError(err) = e {
                // CloudFormation reports a missing stack as a validation error
                if err.err().meta().code() == Some("ValidationError") {
                    return Ok(false);
                } else {
                    return Err(eyre::eyre!(
                        "Service error while describing stack: {:?}",
                        err
                    ));
                }
            } else {
                return Err(eyre::eyre!("Failed to describe stack: {:?}", e));
            }
        }

        Ok(true)
    }

    /// Create the stack or update it with the template
    pub(crate) async fn provision(&self, template: &str) -> eyre::Result<Provision> {
        let capabilities = Capability::CapabilityIam;

        if !self.is_exists().await? {
            log::info!("Creating stack {}", self.name);

            self.client
                .create_stack()
                .capabilities(capabilities)
                .stack_name(&self.name)
                .template_body(template)
                .send()
                .await
                .wrap_err("Failed to create stack")?;

            return Ok(Provision::Created);
        }

        log::info!("Updating stack {}", self.name);

        let result = self
            .client
            .update_stack()
            .capabilities(capabilities)
            .stack_name(&self.name)
            .template_body(template)
            .send()
            .await;

        match result {
            Ok(_) => Ok(Provision::Updated),

            Err(SdkError::ServiceError(err))
                if err
                    .err()
                    .meta()
                    .message()
                    .is_some_and(|m| m.contains("No updates are to be performed")) =>
            {
                Ok(Provision::Unchanged)
            }

            Err(e) => Err(eyre::eyre!("Failed to update stack: {:?}", e)),
        }
    }

    pub(crate) async fn status(&self) -> eyre::Result<Status> {
        let output = self
            .client
            .describe_stacks()
            .stack_name(&self.name)
            .send()
            .await
            .wrap_err("Failed to describe stack")?;

        let stack = output
            .stacks()
            .first()
            .wrap_err(format!("Stack {} not found", self.name))?;

        let status = stack
            .stack_status()
            .wrap_err("Missing stack status")?
            .as_str();

        log::debug!("Stack {} is {status}", self.name);
        Ok(Status::from_stack_status(status, stack.stack_status_reason()))
    }

    /// Poll the stack until CloudFormation is done with it
    pub(crate) async fn wait(&self) -> eyre::Result<Status> {
        loop {
            let status = self.status().await?;

            if status != Status::InProgress {
                return Ok(status);
            }

            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }
}
