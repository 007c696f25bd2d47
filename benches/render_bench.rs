use criterion::{criterion_group, criterion_main, Criterion};

use quotecard::{export, Background, CardRenderer, Color, ExportFormat, Theme};

const QUOTE: &str = "Perfection is achieved, not when there is nothing more to add, \
                     but when there is nothing left to take away.";

fn bench_render_solid(c: &mut Criterion) {
    let mut renderer = CardRenderer::new();
    let theme = Theme {
        canvas_width_px: 800,
        canvas_height_px: 400,
        ..Theme::default()
    };

    c.bench_function("render_solid_card", |b| {
        b.iter(|| {
            let _ = renderer.render(&theme, QUOTE).unwrap();
        })
    });
}

fn bench_render_gradient_with_shadow(c: &mut Criterion) {
    let mut renderer = CardRenderer::new();
    let mut theme = Theme {
        background: Background::Gradient {
            colors: [Color::rgb(0xff, 0x6b, 0x6b), Color::rgb(0x4e, 0xcd, 0xc4)],
            angle_degrees: 135.0,
        },
        canvas_width_px: 800,
        canvas_height_px: 400,
        ..Theme::default()
    };
    theme.effects.shadow_enabled = true;
    theme.effects.shadow_blur_px = 6.0;

    c.bench_function("render_gradient_shadow_card", |b| {
        b.iter(|| {
            let _ = renderer.render(&theme, QUOTE).unwrap();
        })
    });
}

fn bench_encode_png(c: &mut Criterion) {
    let mut renderer = CardRenderer::new();
    let theme = Theme {
        canvas_width_px: 800,
        canvas_height_px: 400,
        ..Theme::default()
    };
    let card = renderer.render(&theme, QUOTE).unwrap();

    c.bench_function("encode_png", |b| {
        b.iter(|| {
            let _ = export::encode(&card, ExportFormat::Png, 92).unwrap();
        })
    });
}

criterion_group!(
    benches,
    bench_render_solid,
    bench_render_gradient_with_shadow,
    bench_encode_png
);
criterion_main!(benches);
