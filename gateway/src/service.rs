//! The gateway as an independent task. Callers talk to it through a
//! [`GatewayClient`]; each request carries its own reply channel, and a caller
//! that stops waiting simply drops that channel.

use std::{
    collections::BTreeMap,
    future::Future,
    sync::Arc,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use confidential_swap_primitives::CiphertextHandle;
use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
};
use tracing::{debug, info, warn};

use crate::{
    config::RetryPolicy,
    error::GatewayError,
    gateway::{BoundContext, EncryptedInput, Gateway, SignedDecryptRequest},
};

type Reply<T> = oneshot::Sender<Result<T, GatewayError>>;

pub(crate) enum Request {
    Encrypt {
        plaintext: u64,
        context: BoundContext,
        reply: Reply<EncryptedInput>,
    },
    Decrypt {
        request: SignedDecryptRequest,
        reply: Reply<BTreeMap<CiphertextHandle, u64>>,
    },
}

/// Seconds since the unix epoch, as used by decrypt authorizations.
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or(0)
}

pub struct GatewayService {
    gateway: Arc<Gateway>,
    requests: mpsc::Receiver<Request>,
}

impl GatewayService {
    /// Start the service on the current tokio runtime. It stops once every
    /// client has been dropped.
    pub fn spawn(gateway: Gateway) -> (GatewayClient, JoinHandle<()>) {
        let config = gateway.config().clone();
        let (tx, rx) = mpsc::channel(config.channel_capacity);
        let service = Self {
            gateway: Arc::new(gateway),
            requests: rx,
        };
        let handle = tokio::spawn(service.run());
        (
            GatewayClient::new(tx, config.request_timeout(), config.retry),
            handle,
        )
    }

    async fn run(mut self) {
        info!("gateway service started");
        while let Some(request) = self.requests.recv().await {
            let gateway = self.gateway.clone();
            // Discrete logs are CPU bound.
            tokio::task::spawn_blocking(move || serve(&gateway, request, unix_now()));
        }
        info!("all clients gone, gateway service stopped");
    }
}

fn serve(gateway: &Gateway, request: Request, now: u64) {
    match request {
        Request::Encrypt {
            plaintext,
            context,
            reply,
        } => {
            if reply.is_closed() {
                debug!("encrypt request cancelled before it ran");
                return;
            }
            let _ = reply.send(gateway.encrypt(plaintext, &context));
        }
        Request::Decrypt { request, reply } => {
            if reply.is_closed() {
                debug!("decrypt request cancelled before it ran");
                return;
            }
            let _ = reply.send(gateway.decrypt(&request, now));
        }
    }
}

/// Cheap to clone handle to a running [`GatewayService`].
#[derive(Clone, Debug)]
pub struct GatewayClient {
    pub(crate) requests: mpsc::Sender<Request>,
    timeout: Duration,
    retry: RetryPolicy,
}

impl GatewayClient {
    pub(crate) fn new(requests: mpsc::Sender<Request>, timeout: Duration, retry: RetryPolicy) -> Self {
        Self {
            requests,
            timeout,
            retry,
        }
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    pub async fn encrypt(
        &self,
        plaintext: u64,
        context: BoundContext,
    ) -> Result<EncryptedInput, GatewayError> {
        self.call(|reply| Request::Encrypt {
            plaintext,
            context,
            reply,
        })
        .await
    }

    pub async fn user_decrypt(
        &self,
        request: SignedDecryptRequest,
    ) -> Result<BTreeMap<CiphertextHandle, u64>, GatewayError> {
        self.call(|reply| Request::Decrypt { request, reply }).await
    }

    async fn call<T>(&self, build: impl FnOnce(Reply<T>) -> Request) -> Result<T, GatewayError> {
        let (reply, response) = oneshot::channel();
        let exchange = async {
            if self.requests.send(build(reply)).await.is_err() {
                return Err(GatewayError::ServiceUnavailable);
            }
            response
                .await
                .unwrap_or(Err(GatewayError::ServiceUnavailable))
        };
        tokio::time::timeout(self.timeout, exchange)
            .await
            .map_err(|_| GatewayError::Timeout)?
    }
}

/// Run `op` until it succeeds, fails with a non-transient error, or the
/// policy runs out of attempts.
pub async fn with_retry<T, F, Fut>(policy: &RetryPolicy, mut op: F) -> Result<T, GatewayError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, GatewayError>>,
{
    let mut attempt = 1;
    loop {
        match op().await {
            Err(e) if e.is_transient() && attempt < policy.max_attempts => {
                warn!(attempt, error = %e, "gateway call failed, retrying");
                tokio::time::sleep(policy.backoff(attempt)).await;
                attempt += 1;
            }
            result => return result,
        }
    }
}
