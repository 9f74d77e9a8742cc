//! Headless walk-through: a provider scope owns a shared cache, and each
//! lookup runs in its own session below it. Responses come from a fake
//! network that only answers when `flush` is called, so the pending state is
//! visible in the output.

use std::cell::RefCell;
use std::collections::HashMap;
use std::future::Future;
use std::rc::Rc;

use futures::channel::oneshot;
use futures::executor::LocalPool;
use serde::Serialize;
use settle_core::prelude::*;

#[derive(Clone, Debug, Serialize)]
struct Pokemon {
    name: String,
    number: u32,
}

type Reply = Result<Pokemon, String>;

#[derive(Clone, Default)]
struct FakeNetwork {
    in_flight: Rc<RefCell<Vec<(String, oneshot::Sender<Reply>)>>>,
}

impl FakeNetwork {
    fn fetch(&self, name: &str) -> impl Future<Output = Reply> + use<> {
        let (tx, rx) = oneshot::channel();
        self.in_flight.borrow_mut().push((name.to_string(), tx));
        async move { rx.await.unwrap_or_else(|_| Err("request dropped".to_string())) }
    }

    /// Answers every outstanding request.
    fn flush(&self) {
        let pokedex: HashMap<&str, u32> = [("pikachu", 25), ("mew", 151), ("bulbasaur", 1)].into();
        for (name, tx) in self.in_flight.borrow_mut().drain(..) {
            let reply = match pokedex.get(name.as_str()) {
                Some(&number) => Ok(Pokemon { name, number }),
                None => Err(format!("unsupported pokemon: \"{name}\"")),
            };
            let _ = tx.send(reply);
        }
    }
}

fn session(
    provider: &Scope,
    pool: &LocalPool,
    label: &str,
) -> (Scope, AsyncRunner<Pokemon, String>) {
    let scope = provider.child();
    let options = RunnerOptions::default().with_label(label);
    let runner = AsyncRunner::new(&scope, pool.spawner(), options);
    runner.subscribe({
        let label = label.to_string();
        move |state| match serde_json::to_string(&state.snapshot()) {
            Ok(json) => println!("[{label}] {json}"),
            Err(err) => log::warn!("[{label}] unprintable state: {err}"),
        }
    });
    (scope, runner)
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut pool = LocalPool::new();
    let network = FakeNetwork::default();
    let provider = Scope::new();
    let cache: ResultCache<String, Pokemon> = ResultCache::new();

    // First lookup goes to the network.
    let (first, info) = session(&provider, &pool, "info-1");
    cache.load(&info, "pikachu".into(), || network.fetch("pikachu"))?;
    network.flush();
    pool.run_until_stalled();
    first.dispose();

    // Same key from a new session: straight from the cache.
    let (second, info) = session(&provider, &pool, "info-2");
    let lookup = cache.load(&info, "pikachu".into(), || network.fetch("pikachu"))?;
    log::info!("second lookup: {lookup:?}");

    // Failures are state, not errors.
    cache.load(&info, "missingno".into(), || network.fetch("missingno"))?;
    network.flush();
    pool.run_until_stalled();
    second.dispose();

    // Session torn down before the reply: info-3 stays pending, but the cache
    // still learns about mew.
    let (third, info) = session(&provider, &pool, "info-3");
    cache.load(&info, "mew".into(), || network.fetch("mew"))?;
    third.dispose();
    network.flush();
    pool.run_until_stalled();
    println!("[info-3] still {} after dispose", info.status());

    let mut previous = cache.keys();
    previous.sort();
    println!("previous pokemon: {}", previous.join(", "));

    provider.dispose();
    Ok(())
}
