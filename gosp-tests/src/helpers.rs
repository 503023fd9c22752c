pub mod fake_worker;
pub mod launchers;

pub use fake_worker::{response_bytes, FakeWorker, WorkerScript};
pub use launchers::{FailingLauncher, NoopLauncher, SpawnWorkerLauncher};
