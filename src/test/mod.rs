mod application;
mod schedulers;
mod selectivity;
mod sim_time;
mod simulator;
mod topology;
