//! Common test fixtures mirroring the NHC GIS archive.
//!
//! Pages are trimmed-down copies of the agency markup: only the anchors the
//! discovery code looks at, wrapped in enough HTML to parse.

/// WGS84 geographic projection as shipped in NHC `.prj` files.
pub const WGS84_PRJ: &str = r#"GEOGCS["GCS_WGS_1984",DATUM["D_WGS_1984",SPHEROID["WGS_1984",6378137.0,298.257223563]],PRIMEM["Greenwich",0.0],UNIT["Degree",0.0174532925199433]]"#;

/// Storms used across the test suite: (ATCF id, year, name).
pub mod storms {
    pub const MICHAEL: (&str, i32, &str) = ("al14", 2018, "MICHAEL");
    pub const FLORENCE: (&str, i32, &str) = ("al06", 2018, "FLORENCE");
    pub const IRMA: (&str, i32, &str) = ("al11", 2017, "IRMA");
    pub const ANA: (&str, i32, &str) = ("al01", 2021, "ANA");
    pub const DIANA: (&str, i32, &str) = ("al04", 2021, "DIANA");
}

/// HTML page builders.
pub mod pages {
    /// A yearly archive index listing one anchor per storm.
    ///
    /// # Arguments
    ///
    /// * `results_page` - Results script the anchors point at
    ///   (e.g. `archive_forecast_results.php`)
    /// * `year` - Season year
    /// * `storms` - `(atcf id, storm name)` pairs
    pub fn archive_index(results_page: &str, year: i32, storms: &[(&str, &str)]) -> String {
        let mut rows = String::new();
        for (id, name) in storms {
            rows.push_str(&format!(
                "<tr><td><a href=\"/gis/{}?id={}&amp;year={}&amp;name=Hurricane {}\">Hurricane {}</a></td></tr>\n",
                results_page, id, year, name, name
            ));
        }
        format!(
            "<html><head><title>NHC GIS Archive</title></head><body>\n\
             <a href=\"/gis/\">GIS Home</a>\n\
             <a href=\"/gis/{}?id=al99&amp;year={}&amp;name=Tropical Storm ZETA\">Tropical Storm ZETA</a>\n\
             <table>\n{}</table></body></html>",
            results_page, year, rows
        )
    }

    /// A storm results page listing archive downloads.
    pub fn storm_page(hrefs: &[&str]) -> String {
        let mut links = String::new();
        for href in hrefs {
            links.push_str(&format!("<li><a href=\"{}\">{}</a></li>\n", href, href));
        }
        format!(
            "<html><body><a href=\"/gis/archive_forecast.php\">Back</a>\n\
             <a href=\"/gis/kml/nhc.kmz\">KMZ</a>\n<ul>\n{}</ul></body></html>",
            links
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_archive_index_contains_storm_anchor() {
        let page = pages::archive_index("archive_forecast_results.php", 2018, &[("al14", "MICHAEL")]);
        assert!(page.contains("name=Hurricane MICHAEL"));
        assert!(page.contains("Tropical Storm ZETA"));
    }

    #[test]
    fn test_storm_page_lists_hrefs() {
        let page = pages::storm_page(&["forecast/archive/al142018_5day_001.zip"]);
        assert!(page.contains("href=\"forecast/archive/al142018_5day_001.zip\""));
    }
}
