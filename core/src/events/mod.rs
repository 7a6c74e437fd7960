mod notifier;
mod signal;

pub use notifier::ChangeNotifier;
pub use signal::StateEvent;
