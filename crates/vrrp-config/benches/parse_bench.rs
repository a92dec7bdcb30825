use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use vrrp_config::{ConfigBuilder, parse_str, source::tokenize};

fn instance_block(n: usize, vips: usize) -> String {
    let mut text = format!(
        "vrrp_instance VI_{n} {{\n    state BACKUP\n    interface eth0\n    virtual_router_id {}\n    priority 100\n    advert_int 1\n    authentication {{\n        auth_type PASS\n        auth_pass secret\n    }}\n    virtual_ipaddress {{\n",
        n % 255 + 1
    );
    for i in 0..vips {
        text.push_str(&format!("        10.{}.{}.{}/24 dev eth0\n", n % 250, i / 250, i % 250 + 1));
    }
    text.push_str("    }\n}\n");
    text
}

fn config_text(instances: usize, vips: usize) -> String {
    let mut text = String::from(
        "vrrp_script chk_haproxy {\n    script \"killall -0 haproxy\"\n    interval 2\n    weight -20\n}\n",
    );
    for n in 0..instances {
        text.push_str(&instance_block(n, vips));
    }
    text
}

fn tokenize_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("tokenize");

    group.bench_function("keyword_line", |b| {
        b.iter(|| black_box(tokenize(black_box("    virtual_router_id 51 # comment"))))
    });

    group.bench_function("quoted_line", |b| {
        b.iter(|| {
            black_box(tokenize(black_box(
                "    notify_master \"/etc/keepalived/notify.sh master VI_1\"",
            )))
        })
    });

    group.finish();
}

fn load_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("load");

    for instances in [1, 10, 100] {
        let text = config_text(instances, 4);
        group.bench_with_input(BenchmarkId::new("instances", instances), &text, |b, text| {
            b.iter(|| black_box(ConfigBuilder::new().load_str(text)))
        });
    }

    group.finish();
}

fn vip_overflow_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("vip_overflow");

    // Addresses past the 20th land in the excluded list
    for vips in [20, 40, 200] {
        let text = config_text(1, vips);
        group.bench_with_input(BenchmarkId::from_parameter(vips), &text, |b, text| {
            b.iter(|| black_box(parse_str(text)))
        });
    }

    group.finish();
}

criterion_group!(benches, tokenize_benchmark, load_benchmark, vip_overflow_benchmark);

criterion_main!(benches);
