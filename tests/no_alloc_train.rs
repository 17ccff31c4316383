use std::alloc::{GlobalAlloc, Layout, System};
use std::sync::atomic::{AtomicUsize, Ordering};

use sgd_mlp::{
    ActivationFunction, Dataset, FitConfig, Network, NetworkBuilder, ObjectiveFunction, Shuffle,
};

struct CountingAlloc {
    allocs: AtomicUsize,
    reallocs: AtomicUsize,
    deallocs: AtomicUsize,
    bytes: AtomicUsize,
}

impl CountingAlloc {
    const fn new() -> Self {
        Self {
            allocs: AtomicUsize::new(0),
            reallocs: AtomicUsize::new(0),
            deallocs: AtomicUsize::new(0),
            bytes: AtomicUsize::new(0),
        }
    }

    fn reset(&self) {
        self.allocs.store(0, Ordering::Relaxed);
        self.reallocs.store(0, Ordering::Relaxed);
        self.deallocs.store(0, Ordering::Relaxed);
        self.bytes.store(0, Ordering::Relaxed);
    }

    fn snapshot(&self) -> AllocSnapshot {
        AllocSnapshot {
            allocs: self.allocs.load(Ordering::Relaxed),
            reallocs: self.reallocs.load(Ordering::Relaxed),
            deallocs: self.deallocs.load(Ordering::Relaxed),
            bytes: self.bytes.load(Ordering::Relaxed),
        }
    }

    fn alloc_events(&self) -> usize {
        self.allocs.load(Ordering::Relaxed) + self.reallocs.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct AllocSnapshot {
    allocs: usize,
    reallocs: usize,
    deallocs: usize,
    bytes: usize,
}

unsafe impl GlobalAlloc for CountingAlloc {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        self.allocs.fetch_add(1, Ordering::Relaxed);
        self.bytes.fetch_add(layout.size(), Ordering::Relaxed);
        unsafe { System.alloc(layout) }
    }

    unsafe fn alloc_zeroed(&self, layout: Layout) -> *mut u8 {
        self.allocs.fetch_add(1, Ordering::Relaxed);
        self.bytes.fetch_add(layout.size(), Ordering::Relaxed);
        unsafe { System.alloc_zeroed(layout) }
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        self.deallocs.fetch_add(1, Ordering::Relaxed);
        unsafe { System.dealloc(ptr, layout) }
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        self.reallocs.fetch_add(1, Ordering::Relaxed);
        // Approximate accounting: record the new size.
        self.bytes.fetch_add(new_size, Ordering::Relaxed);
        unsafe { System.realloc(ptr, layout, new_size) }
    }
}

#[global_allocator]
static ALLOC: CountingAlloc = CountingAlloc::new();

fn make_dataset(len: usize, input_dim: usize, target_dim: usize) -> Dataset {
    let inputs = vec![0.1_f64; len * input_dim];
    let mut targets = vec![0.0_f64; len * target_dim];
    for row in targets.chunks_exact_mut(target_dim) {
        row[0] = 1.0;
    }
    Dataset::from_flat(inputs, targets, input_dim, target_dim).unwrap()
}

fn make_network(input_dim: usize, hidden: usize, output_dim: usize) -> Network {
    let mut net = NetworkBuilder::new(input_dim)
        .unwrap()
        .objective(ObjectiveFunction::CrossEntropy)
        .add_layer(hidden, ActivationFunction::Tanh)
        .unwrap()
        .add_layer(hidden, ActivationFunction::Rectifier)
        .unwrap()
        .add_layer(output_dim, ActivationFunction::Softmax)
        .unwrap()
        .build_with_seed(0)
        .unwrap();
    net.set_learning_rate(1e-2).unwrap();
    net
}

// Single test: the counter is process-wide, so concurrent tests would pollute it.
#[test]
fn training_does_not_allocate_per_step() {
    let input_dim = 32;
    let hidden = 64;
    let output_dim = 8;

    let base = make_network(input_dim, hidden, output_dim);
    let x = vec![0.1_f64; input_dim];
    let mut t = vec![0.0_f64; output_dim];
    t[0] = 1.0;

    // Direct steps: no allocation at all, whatever the number of steps.
    for steps in [1_usize, 500] {
        let mut net = base.clone();
        ALLOC.reset();
        let before = ALLOC.snapshot();
        for _ in 0..steps {
            net.train(&x, &t, 1.0).unwrap();
            let y = net.predict(&x).unwrap();
            assert_eq!(y.len(), output_dim);
        }
        let after = ALLOC.snapshot();
        assert_eq!(
            ALLOC.alloc_events(),
            0,
            "expected no allocation for {steps} steps: before={before:?} after={after:?}"
        );
    }

    // `fit` allocates its bookkeeping once per call, independent of the dataset size.
    let train_small = make_dataset(16, input_dim, output_dim);
    let train_large = make_dataset(16 * 64, input_dim, output_dim);
    let cfg = FitConfig {
        epochs: 2,
        shuffle: Shuffle::Seeded(0),
    };

    // Warm-up: logging callsites register themselves on first use.
    base.clone().fit(&train_small, &cfg).unwrap();

    let mut net_small = base.clone();
    ALLOC.reset();
    let before_small = ALLOC.snapshot();
    net_small.fit(&train_small, &cfg).unwrap();
    let alloc_small = ALLOC.alloc_events();
    let after_small = ALLOC.snapshot();

    let mut net_large = base;
    ALLOC.reset();
    let before_large = ALLOC.snapshot();
    net_large.fit(&train_large, &cfg).unwrap();
    let alloc_large = ALLOC.alloc_events();
    let after_large = ALLOC.snapshot();

    assert_eq!(
        alloc_small, alloc_large,
        "expected allocation event count to be independent of steps.\n\
small: before={before_small:?} after={after_small:?}\n\
large: before={before_large:?} after={after_large:?}"
    );
}
