use accounts::Config;

fn main() -> anyhow::Result<()> {
    let config = Config::load()?;
    config.validate()?;

    let mut runtime = tokio::runtime::Builder::new_multi_thread();
    runtime.enable_all();
    // 0 leaves the worker count to tokio (one per core)
    if let Some(threads) = std::num::NonZeroUsize::new(config.general.worker_threads) {
        runtime.worker_threads(threads.get());
    }

    runtime.build()?.block_on(accounts::run(&config))
}
