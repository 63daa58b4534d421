use rand::rngs::StdRng;
use rand::SeedableRng;

pub fn test_logger() {
    // Tests run in parallel, so only the first initialisation wins.
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Runs `test_function` with an rng seeded from `TOKEN_AUTOMATA_SEED`, or from a
/// random seed that is printed so a failing run can be replayed.
pub fn random_test<F>(iterations: usize, mut test_function: F)
where
    F: FnMut(&mut StdRng),
{
    test_logger();

    let seed = match std::env::var("TOKEN_AUTOMATA_SEED") {
        Ok(seed) => seed
            .parse::<u64>()
            .expect("TOKEN_AUTOMATA_SEED must be a valid u64"),
        Err(_) => rand::random(),
    };
    println!("seed: {seed} (use TOKEN_AUTOMATA_SEED=<seed> to replay)");

    let mut rng = StdRng::seed_from_u64(seed);
    for _ in 0..iterations {
        test_function(&mut rng);
    }
}
