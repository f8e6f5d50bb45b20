pub mod app;
pub mod fog;
pub mod placement;
pub mod scenario;
pub mod sched;
pub mod sim;
pub mod trace;

#[cfg(test)]
mod test;
