pub mod server;

use std::{sync::Arc, time::Duration};

use tokio::{
  task::{JoinHandle, JoinSet},
  time::sleep,
};

use crate::{prelude::*, state::AppState};

const MIN_BACKOFF: Duration = Duration::from_secs(1);
const MAX_BACKOFF: Duration = Duration::from_secs(60);
/// A run at least this long resets the restart backoff.
const STABLE_RUN: Duration = Duration::from_secs(300);

/// Long-running part of the process, restarted when it stops.
#[async_trait::async_trait]
pub trait Plugin: Send + Sync {
  fn name(&self) -> &'static str {
    std::any::type_name::<Self>()
  }

  async fn start(&self, app: Arc<AppState>) -> anyhow::Result<()>;
}

#[derive(Default)]
pub struct App {
  plugins: Vec<Arc<dyn Plugin>>,
}

impl App {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn register<P: Plugin + 'static>(mut self, plugin: P) -> Self {
    self.plugins.push(Arc::new(plugin));
    self
  }

  /// Spawns a supervisor per plugin. Aborting a handle stops its plugin.
  pub fn run(self, app: Arc<AppState>) -> Vec<JoinHandle<()>> {
    self
      .plugins
      .into_iter()
      .map(|plugin| tokio::spawn(supervise(plugin, app.clone())))
      .collect()
  }
}

async fn supervise(plugin: Arc<dyn Plugin>, app: Arc<AppState>) {
  let name = plugin.name();
  let mut backoff = MIN_BACKOFF;
  info!("Plugin `{name}` started");

  loop {
    let started = tokio::time::Instant::now();
    // dropping the set aborts the running plugin along with its supervisor
    let mut task = JoinSet::new();
    let (plugin, app) = (plugin.clone(), app.clone());
    task.spawn(async move { plugin.start(app).await });

    match task.join_next().await {
      Some(Ok(Ok(()))) => warn!("Plugin `{name}` returned without error"),
      Some(Ok(Err(err))) => error!("Plugin `{name}` failed: {err:#}"),
      Some(Err(err)) if err.is_panic() => error!("Plugin `{name}` panicked"),
      Some(Err(_)) | None => {
        info!("Plugin `{name}` cancelled");
        break;
      }
    }

    let delay = restart_delay(backoff, started.elapsed());
    info!("Restarting plugin `{name}` in {}s", delay.as_secs());
    sleep(delay).await;
    backoff = (delay * 2).min(MAX_BACKOFF);
  }
}

fn restart_delay(backoff: Duration, ran_for: Duration) -> Duration {
  if ran_for >= STABLE_RUN { MIN_BACKOFF } else { backoff }
}
