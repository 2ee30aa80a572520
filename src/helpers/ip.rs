use ipnet::IpNet;

pub trait IsDefaultRoute {
    /// A zero-length prefix (`0.0.0.0/0` or `::/0`) is the reserved
    /// default-route no-op announcement and is excluded from all derived
    /// metadata.
    fn is_default_route(&self) -> bool;
}

impl IsDefaultRoute for IpNet {
    fn is_default_route(&self) -> bool {
        self.prefix_len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assertor::*;

    fn net(input: &str) -> IpNet {
        input.parse().expect(input)
    }

    #[test]
    fn default_routes_both_families() {
        assert_that!(net("0.0.0.0/0").is_default_route()).is_true();
        assert_that!(net("::/0").is_default_route()).is_true();
    }

    #[test]
    fn real_prefixes_are_not_default() {
        assert_that!(net("10.0.0.0/24").is_default_route()).is_false();
        assert_that!(net("2001:db8::/32").is_default_route()).is_false();
    }
}
