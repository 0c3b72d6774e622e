use std::{
    error::Error,
    sync::atomic::{AtomicU64, Ordering},
};

use tracing_subscriber::EnvFilter;
use wrapp_ioc::{Catalog, Depends, LifecycleManager, StopOrder, TypeDescriptor};

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .init();

    let catalog = Catalog::new()
        .register(
            "demo",
            TypeDescriptor::managed::<Greeter>()
                .depends_on("counter", |greeter: &Greeter| &greeter.counter)
                .on_start(Greeter::greet)
                .on_stop(Greeter::farewell),
        )
        .register(
            "demo",
            TypeDescriptor::managed::<Counter>()
                .named("counter")
                .on_start(Counter::reset),
        );

    let manager = LifecycleManager::builder("demo")
        .discovery(catalog)
        .stop_order(StopOrder::Reverse)
        .build();

    manager.initialize()?;
    println!("{:?}", manager);

    manager.start()?;
    manager.stop()?;

    let counter = manager.require::<Counter>()?;
    println!("Greeted {} times", counter.value.load(Ordering::SeqCst));
    Ok(())
}

#[derive(Debug, Default)]
struct Counter {
    value: AtomicU64,
}
impl Counter {
    fn reset(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.value.store(0, Ordering::SeqCst);
        Ok(())
    }
}

#[derive(Default)]
struct Greeter {
    counter: Depends<Counter>,
}
impl Greeter {
    fn greet(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        let count = self.counter.value.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::info!("Hello for the {count}. time");
        Ok(())
    }

    fn farewell(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        tracing::info!("Goodbye");
        Ok(())
    }
}
