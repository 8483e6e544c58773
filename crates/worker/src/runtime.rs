// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The poll-claim-execute loop.

use crate::config::WorkerConfig;
use crate::coordinator::CoordinatorClient;
use crate::execute::Executor;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use gl_loaders::LoaderRegistry;
use gl_store::{StorePool, WorkerStore};
use gl_telemetry::BatchedLogger;
use tokio_util::sync::CancellationToken;

/// Ambient AWS identity, optionally assuming `AWS_ROLE_ARN`.
pub async fn aws_config() -> SdkConfig {
    let mut loader = aws_config::defaults(BehaviorVersion::latest());
    if let Ok(region) = std::env::var("AWS_REGION") {
        loader = loader.region(Region::new(region));
    }
    if let Ok(profile) = std::env::var("AWS_PROFILE") {
        loader = loader.profile_name(&profile);
    }
    let base = loader.load().await;

    let Ok(role_arn) = std::env::var("AWS_ROLE_ARN") else {
        return base;
    };
    tracing::info!(role = %role_arn, "assuming role for object-store access");
    let provider = aws_config::sts::AssumeRoleProvider::builder(role_arn)
        .session_name("gleaner-worker")
        .configure(&base)
        .build()
        .await;
    aws_config::defaults(BehaviorVersion::latest())
        .credentials_provider(provider)
        .load()
        .await
}

pub struct WorkerRuntime {
    config: WorkerConfig,
    coordinator: CoordinatorClient,
    executor: Executor,
    workers: WorkerStore,
}

impl WorkerRuntime {
    pub fn new(
        config: WorkerConfig,
        pool: StorePool,
        registry: LoaderRegistry,
        telemetry: BatchedLogger,
    ) -> Result<Self, crate::coordinator::CoordinatorError> {
        let coordinator = CoordinatorClient::new(config.coordinator_url.clone())?;
        let workers = WorkerStore::new(pool.clone());
        let executor = Executor {
            pool,
            registry,
            coordinator: coordinator.clone(),
            telemetry,
            config: config.clone(),
        };
        Ok(Self { config, coordinator, executor, workers })
    }

    /// Poll until shutdown. One job at a time; a lost claim race just means
    /// polling again.
    pub async fn run(&self, shutdown: CancellationToken) {
        tracing::info!(
            worker_id = %self.config.worker_id,
            capabilities = ?self.config.capabilities,
            coordinator = %self.config.coordinator_url,
            "worker started, polling for jobs"
        );

        // Register immediately so the fleet is visible before the first claim.
        if let Err(error) = self
            .workers
            .heartbeat(
                self.config.worker_id.as_str(),
                &self.config.hostname,
                &self.config.capabilities,
            )
            .await
        {
            tracing::error!(%error, "initial worker registration failed");
        }

        while !shutdown.is_cancelled() {
            let result = self.poll_once().await;
            if self.config.once {
                break;
            }
            match result {
                // Work done or a claim race lost: check for more right away.
                PollResult::Executed | PollResult::LostRace => {}
                PollResult::Idle => {
                    tokio::select! {
                        _ = shutdown.cancelled() => break,
                        _ = tokio::time::sleep(self.config.poll_interval) => {}
                    }
                }
            }
        }

        if let Err(error) = self.workers.mark_idle(self.config.worker_id.as_str()).await {
            tracing::debug!(%error, "failed to mark worker idle on shutdown");
        }
        tracing::info!("worker stopped");
    }

    async fn poll_once(&self) -> PollResult {
        let offer = match self
            .coordinator
            .claim(self.config.worker_id.as_str(), &self.config.capabilities)
            .await
        {
            Ok(Some(job)) => job,
            Ok(None) => {
                tracing::debug!("no jobs available");
                return PollResult::Idle;
            }
            Err(error) => {
                tracing::error!(%error, "claim request failed");
                return PollResult::Idle;
            }
        };

        // The offer is not ours until the conditional update lands.
        match self.executor.pool.execute_claim(&offer.claim_instruction).await {
            Ok(0) => {
                tracing::info!(job_id = %offer.job_id, "lost claim race, re-polling");
                return PollResult::LostRace;
            }
            Ok(_) => {
                tracing::info!(job_id = %offer.job_id, job_type = %offer.job_type, "claimed job");
            }
            Err(error) => {
                tracing::error!(%error, job_id = %offer.job_id, "claim execution failed");
                return PollResult::Idle;
            }
        }

        if let Err(error) = self.executor.execute(&offer).await {
            tracing::error!(job_id = %offer.job_id, %error, "job execution failed");
        }
        PollResult::Executed
    }
}

enum PollResult {
    Executed,
    LostRace,
    Idle,
}
