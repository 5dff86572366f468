//! Demo: build a triangle and watch its notifications

use std::sync::Arc;
use std::time::{Duration, Instant};

use meshgraph::prelude::*;

/// Logs every notification it receives
struct Logger {
    id: EntityId,
    label: &'static str,
}

impl Subscriber for Logger {
    fn subscriber_id(&self) -> EntityId {
        self.id
    }

    fn update(&self, notification: &Notification) {
        log::info!("{} heard {:?} from {}", self.label, notification.tags, notification.source);
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let dispatcher = match Dispatcher::install(UpdateConfig::from_env()) {
        Ok(dispatcher) => dispatcher,
        Err(e) => {
            eprintln!("Dispatcher error: {}", e);
            return;
        }
    };
    let factory = KindControllerFactory::with_defaults();

    let create = |mesh: Mesh| factory.create_controller(mesh);
    let (Some(a), Some(b), Some(c)) = (
        create(Mesh::vertex(0.0, 0.0, 0.0)),
        create(Mesh::vertex(1.0, 0.0, 0.0)),
        create(Mesh::vertex(0.0, 1.0, 0.0)),
    ) else {
        return;
    };
    let edges: Vec<_> = [(&a, &b), (&b, &c), (&c, &a)]
        .into_iter()
        .filter_map(|(v1, v2)| create(Mesh::linear_edge(v1, v2)))
        .collect();
    let Some(triangle) = create(Mesh::detailed_face()) else {
        return;
    };

    let listener: Arc<dyn Subscriber> = Arc::new(Logger {
        id: EntityId::next(),
        label: "triangle",
    });
    triangle.updates().register(&listener);

    for edge in &edges {
        triangle.add(edge);
        log::info!("Edge length {:?}", edge.model().length());
    }
    log::info!(
        "Triangle has {} vertices, loop of {}",
        triangle.children(&Category::VERTICES).len(),
        triangle.model().vertex_loop().len()
    );

    triangle.set_property(keys::NAME, "triangle");
    a.model().update_location(0.0, 0.0, 2.0);
    triangle.set_translation([0.0, 0.0, 5.0]);
    triangle.set_synched();

    let copy = triangle.deep_clone();
    log::info!("Clone equals original: {}", copy == triangle);

    // Let the workers drain before exiting
    let deadline = Instant::now() + Duration::from_secs(1);
    while !dispatcher.is_idle() && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(5));
    }
    log::info!("{:?}", dispatcher.stats());
}
