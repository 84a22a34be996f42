//! Startup configuration of the process-wide capabilities.
//!
//! Run with `RUST_LOG=info` to see what each call logs.

use tracing_subscriber::EnvFilter;
use veccap_core::prelude::*;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    CapabilityConfigurator::report_version();

    let features = cpu_features();
    println!("Detected CPU features: {:?}", features);
    println!("Build features: {:?}", build_features());

    let config = CapabilityConfig::builder()
        .simd_tier(CapabilityTier::Auto)
        .blas_threshold(16384)
        .early_stop_threshold(0.1)
        .clustering_strategy(ClusteringStrategy::KMeansPlusPlus)
        .build_threads(num_cpus::get())
        .search_threads(num_cpus::get())
        .async_io_contexts(8)
        .accelerator(0, 4)
        .accelerator_mem_pool(256 << 20, 1 << 30)
        .build();
    config.validate()?;

    match CapabilityConfigurator::apply(&config) {
        Ok(report) => {
            println!("Bound kernels: {}", report.bound_kernels.unwrap_or_default());
            println!("Async I/O ready: {:?}", report.async_io_ready);
        }
        // Options before the accelerator are already applied.
        Err(err) => println!("Accelerator unavailable: {}", err),
    }
    println!("Accelerator: {:?}", CapabilityConfigurator::accelerator_status());

    let a = vec![1.0_f32; 768];
    let b = vec![0.5_f32; 768];
    let kernels = global().kernels();
    println!("l2_sqr = {}", (kernels.l2_sqr)(&a, &b));

    let pool = CapabilityConfigurator::search_thread_pool()?;
    let sum: f32 = pool.install(|| (kernels.inner_product)(&a, &b));
    println!("inner_product on search pool = {}", sum);

    CapabilityConfigurator::free_accelerator_resources();
    Ok(())
}
