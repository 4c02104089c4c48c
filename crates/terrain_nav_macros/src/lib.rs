use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, FnArg, ItemFn, Pat};

/// Time a function when the `perf_stats` feature is enabled.
///
/// The function body is wrapped with a guard that logs the elapsed time on
/// exit if it exceeds the threshold. Without `perf_stats` the guard is not
/// emitted.
///
/// # Grid-aware logging
/// If the function takes a parameter named `grid` (e.g. `grid: &NavGrid`),
/// the log line also reports the grid's tile count.
///
/// # Example
/// ```ignore
/// #[profile]
/// pub fn search(&mut self, grid: &NavGrid, start: TileIndex, goal: TileIndex) -> PathOutcome {
///     // ... work ...
/// }
///
/// #[profile(5)]  // threshold in milliseconds (default 1)
/// pub fn build(config: &TerrainConfig, source: &dyn ElevationSource) -> TerrainResult<NavGrid> { ... }
/// ```
#[proc_macro_attribute]
pub fn profile(attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);

    let threshold_ms: u128 = if attr.is_empty() {
        1
    } else {
        attr.to_string().trim().parse().unwrap_or(1)
    };

    let attrs = &input.attrs;
    let vis = &input.vis;
    let sig = &input.sig;
    let block = &input.block;
    let fn_name_str = sig.ident.to_string();

    let has_grid_param = sig.inputs.iter().any(|arg| match arg {
        FnArg::Typed(pat_type) => {
            matches!(&*pat_type.pat, Pat::Ident(pat_ident) if pat_ident.ident == "grid")
        }
        FnArg::Receiver(_) => false,
    });

    let tiles_expr = if has_grid_param {
        quote! { Some(grid.tile_count()) }
    } else {
        quote! { None }
    };

    let output = quote! {
        #(#attrs)*
        #vis #sig {
            #[cfg(feature = "perf_stats")]
            let _profile_timer = {
                struct ProfileGuard {
                    name: &'static str,
                    start: std::time::Instant,
                    tiles: Option<usize>,
                }
                impl Drop for ProfileGuard {
                    fn drop(&mut self) {
                        let elapsed = self.start.elapsed();
                        if elapsed.as_millis() >= #threshold_ms {
                            match self.tiles {
                                Some(tiles) => bevy::log::info!(
                                    "[PERF] {}: {:?} ({} tiles)", self.name, elapsed, tiles
                                ),
                                None => bevy::log::info!("[PERF] {}: {:?}", self.name, elapsed),
                            }
                        }
                    }
                }
                ProfileGuard {
                    name: #fn_name_str,
                    start: std::time::Instant::now(),
                    tiles: #tiles_expr,
                }
            };

            #block
        }
    };

    output.into()
}
