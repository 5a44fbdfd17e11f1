// Copyright 2018-2022 argmin developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Progress reporting, emitting a `date time iter log10(f)` table, modeled
//! on `argmin::core::observers::Observe` and
//! `argmin-observer-slog::SlogLogger`, specialized to this crate's single
//! concrete state type rather than a generic `State` bound.

use crate::error::Error;
use crate::kv::KV;
use crate::state::IterationRecord;

/// Receives a callback once after initialization and once per accepted
/// iteration. Implementors may log, write to a file, or collect history in
/// memory; the driver does not care which.
pub trait Observe {
    /// Called once, before the first iteration, with a human-readable
    /// summary of the run about to start.
    fn observe_init(&mut self, msg: &str, kv: &KV) -> Result<(), Error>;

    /// Called after every accepted iteration (subject to `cfg.progress`'s
    /// cadence, enforced by the driver, not by implementations of this
    /// trait).
    fn observe_iter(&mut self, record: &IterationRecord, kv: &KV) -> Result<(), Error>;
}

/// A logger using [`slog`] as backend, gated behind the `slog-logger`
/// feature (default-enabled).
#[cfg(feature = "slog-logger")]
pub struct SlogLogger {
    logger: slog::Logger,
}

#[cfg(feature = "slog-logger")]
impl SlogLogger {
    /// Log to the terminal, blocking execution when the buffer is full.
    pub fn term() -> Self {
        Self::term_internal(slog_async::OverflowStrategy::Block)
    }

    /// Log to the terminal without blocking; messages may be dropped under
    /// buffer pressure.
    pub fn term_noblock() -> Self {
        Self::term_internal(slog_async::OverflowStrategy::Drop)
    }

    fn term_internal(overflow_strategy: slog_async::OverflowStrategy) -> Self {
        use slog::Drain;

        let decorator = slog_term::TermDecorator::new().build();
        let drain = slog_term::FullFormat::new(decorator)
            .use_original_order()
            .build()
            .fuse();
        let drain = slog_async::Async::new(drain)
            .overflow_strategy(overflow_strategy)
            .build()
            .fuse();
        SlogLogger {
            logger: slog::Logger::root(drain, slog::o!()),
        }
    }
}

#[cfg(feature = "slog-logger")]
struct SlogKV<'a>(&'a KV);

#[cfg(feature = "slog-logger")]
impl slog::KV for SlogKV<'_> {
    fn serialize(
        &self,
        _record: &slog::Record,
        serializer: &mut dyn slog::Serializer,
    ) -> slog::Result {
        // KV's backing map is not publicly iterable; emit the values
        // callers are documented to populate instead of reaching into it.
        for key in ["beta", "ys", "reset", "restarted", "backtracks", "bracket_iters", "radius", "rho", "reason"] {
            if let Some(v) = self.0.get(key) {
                serializer.emit_str(slog::Key::from(key.to_string()), &v.to_string())?;
            }
        }
        Ok(())
    }
}

#[cfg(feature = "slog-logger")]
impl Observe for SlogLogger {
    fn observe_init(&mut self, msg: &str, kv: &KV) -> Result<(), Error> {
        slog::info!(self.logger, "{}", msg; SlogKV(kv));
        Ok(())
    }

    fn observe_iter(&mut self, record: &IterationRecord, kv: &KV) -> Result<(), Error> {
        slog::info!(
            self.logger, "";
            "iter" => record.iter,
            "log10(f)" => record.f.abs().max(f64::MIN_POSITIVE).log10(),
            "|g|" => record.grad_norm,
            "alpha" => record.alpha,
            SlogKV(kv)
        );
        Ok(())
    }
}
