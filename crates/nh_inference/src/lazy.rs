use std::fmt;
use std::sync::Arc;

use nh_core::LanguageModel;
use tokio::sync::OnceCell;

type ModelFactory = Box<dyn Fn() -> Option<Arc<dyn LanguageModel>> + Send + Sync>;

/// A language model handle built on first use and shared afterwards.
/// A factory that yields nothing is remembered too; it is not retried.
pub struct LazyModel {
    cell: OnceCell<Option<Arc<dyn LanguageModel>>>,
    factory: ModelFactory,
}

impl LazyModel {
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn() -> Option<Arc<dyn LanguageModel>> + Send + Sync + 'static,
    {
        Self {
            cell: OnceCell::new(),
            factory: Box::new(factory),
        }
    }

    pub fn preloaded(model: Option<Arc<dyn LanguageModel>>) -> Self {
        Self {
            cell: OnceCell::new_with(Some(model)),
            factory: Box::new(|| None),
        }
    }

    pub async fn get(&self) -> Option<Arc<dyn LanguageModel>> {
        self.cell
            .get_or_init(|| async {
                let model = (self.factory)();
                match &model {
                    Some(m) => tracing::info!("🧠 Language model ready: {}", m.name()),
                    None => tracing::info!("🧠 No language model available"),
                }
                model
            })
            .await
            .clone()
    }
}

impl fmt::Debug for LazyModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self.cell.get() {
            None => "uninitialized",
            Some(None) => "absent",
            Some(Some(_)) => "ready",
        };
        f.debug_struct("LazyModel").field("state", &state).finish()
    }
}
