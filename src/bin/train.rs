use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    trip_duration::apps::run_train(std::env::args().skip(1))
}
