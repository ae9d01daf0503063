//! Role-specific destinations a verified user is sent to

/// Client-side routes reachable from the verification page.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Destination {
    /// Lawyers draft contracts
    ContractDrafting,
    /// Buyers browse land listings
    LandListing,
    SellerHome,
}

impl Destination {
    pub fn path(&self) -> &'static str {
        match self {
            Destination::ContractDrafting => "/lawyer/draft-contract",
            Destination::LandListing => "/buyer/land-display",
            Destination::SellerHome => "/seller/seller-page",
        }
    }
}

impl std::fmt::Display for Destination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_destination_paths_are_distinct() {
        let all = [
            Destination::ContractDrafting,
            Destination::LandListing,
            Destination::SellerHome,
        ];
        let mut paths: Vec<_> = all.iter().map(|d| d.path()).collect();
        paths.sort();
        paths.dedup();
        assert_eq!(paths.len(), all.len());
    }
}
