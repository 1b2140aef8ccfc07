//! Plot output for the analysis pass: gnuplot scripts rendered to PDF and
//! optional native PNG charts.
mod cdf;
mod gnuplot;


pub use cdf::{plot_cdf, plot_cdf_charts, render_cdf_charts};
pub use gnuplot::{
    GnuplotScript, analysis_scripts, cdf_script, multiplot_script, render_scripts, run_gnuplot,
    write_scripts,
};
