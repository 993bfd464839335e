use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// tracingのサブスクライバーを初期化する
///
/// `RUST_LOG` が未設定の場合は `sigabe_circulation=debug`。
/// 既に初期化済みの場合は何もしない。
pub fn init() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sigabe_circulation=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .ok();
}
