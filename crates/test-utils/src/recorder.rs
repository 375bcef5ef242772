use std::cell::RefCell;
use std::rc::Rc;

use anyhow::anyhow;
use buildgraph::engine::RunContext;

/// Records which actions ran, in order.
///
/// Clones share the same log, so one recorder can hand out actions for a
/// whole registry and still be inspected afterwards.
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    log: Rc<RefCell<Vec<String>>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Action that records `name` and succeeds.
    pub fn ok(&self, name: &str) -> impl Fn(&mut RunContext) -> anyhow::Result<()> + 'static {
        let log = Rc::clone(&self.log);
        let name = name.to_string();
        move |_ctx| {
            log.borrow_mut().push(name.clone());
            Ok(())
        }
    }

    /// Action that records `name` and fails with `message`.
    pub fn fail(
        &self,
        name: &str,
        message: &str,
    ) -> impl Fn(&mut RunContext) -> anyhow::Result<()> + 'static {
        let log = Rc::clone(&self.log);
        let name = name.to_string();
        let message = message.to_string();
        move |_ctx| {
            log.borrow_mut().push(name.clone());
            Err(anyhow!("{message}"))
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.log.borrow().clone()
    }

    pub fn count(&self, name: &str) -> usize {
        self.log.borrow().iter().filter(|n| *n == name).count()
    }
}
