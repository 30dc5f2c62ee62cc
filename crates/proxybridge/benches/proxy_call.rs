use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use proxybridge::{
    bridge_interface, BridgeProxy, DispatchError, ForeignHandle, InterfaceBridge,
    InterfaceContract, MethodId, Value,
};

#[bridge_interface(name = "java.lang.Runnable")]
pub trait Runnable {
    fn run(&self);
}

#[bridge_interface]
pub trait Adder {
    fn add(&self, a: i32, b: i32) -> i32;
    fn twice(&self, a: i32) -> i32 {
        self.add(a, a)
    }
}

fn dispatch(
    _handle: ForeignHandle,
    method: &MethodId,
    args: &[Value],
) -> Result<Value, DispatchError> {
    match (method.name, args) {
        ("run", []) => Ok(Value::Null),
        ("add", [Value::I32(a), Value::I32(b)]) => Ok(Value::I32(a + b)),
        _ => Err(DispatchError::not_resolvable(method)),
    }
}

fn proxy(bridge: &InterfaceBridge) -> BridgeProxy {
    let contract = InterfaceContract::new()
        .with::<dyn Runnable>()
        .with::<dyn Adder>();
    bridge
        .create_proxy(ForeignHandle::from_raw(1), &contract)
        .unwrap()
}

fn bench_calls(c: &mut Criterion) {
    let bridge = InterfaceBridge::new(dispatch);
    let active = proxy(&bridge);
    let disabled = proxy(&bridge);
    disabled.disable();

    // 1024 calls per iteration, as a host running a callback loop would.
    let mut group = c.benchmark_group("run_x1024");
    group.throughput(Throughput::Elements(1024));
    for (state, proxy) in [("active", &active), ("disabled", &disabled)] {
        group.bench_with_input(BenchmarkId::new("run", state), proxy, |b, proxy| {
            b.iter(|| {
                for _ in 0..1024 {
                    black_box(proxy).run();
                }
            });
        });
    }
    group.finish();

    c.bench_function("add", |b| {
        b.iter(|| active.add(black_box(20), black_box(22)));
    });

    c.bench_function("default_fallback", |b| {
        b.iter(|| active.twice(black_box(21)));
    });
}

fn bench_create(c: &mut Criterion) {
    let bridge = InterfaceBridge::new(dispatch);
    let contract = InterfaceContract::of::<dyn Runnable>();

    c.bench_function("create_proxy", |b| {
        b.iter(|| {
            bridge
                .create_proxy(ForeignHandle::from_raw(black_box(7)), &contract)
                .unwrap()
        });
    });
}

criterion_group!(benches, bench_calls, bench_create);
criterion_main!(benches);
