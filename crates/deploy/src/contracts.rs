//! Typed calldata for every contract call the orchestrator issues.
//!
//! Each contract gets its own interface block because the wrappers expose
//! different `addOracle` and `setUp` signatures under the same names.

use alloy_core::sol;

/// Artifact names of the deployable contracts, as emitted by the Solidity
/// toolchain.
pub mod names {
    pub const ORACLE_VERIFICATION: &str = "OracleVerificationV1";
    pub const PRICE_FEED: &str = "PriceFeedV2";
    pub const CUSTOM_ORACLE_WRAPPER: &str = "CustomOracleWrapper";
    pub const CHAINLINK_WRAPPER: &str = "ChainlinkWrapper";
    pub const TWAP_ORACLE_WRAPPER: &str = "TwapOracleWrapper";
    pub const PROXY_ADMIN: &str = "ProxyAdmin";
    pub const TRANSPARENT_PROXY: &str = "TransparentUpgradeableProxy";
    pub const MOCK_ERC20: &str = "MockERC20";
    pub const MOCK_ORACLE: &str = "MockOracle";
}

sol! {
    /// Ownable surface shared by the suite contracts and the proxy admin.
    interface IOwnable {
        function owner() external view returns (address);
        function transferOwnership(address newOwner) external;
    }
}

sol! {
    /// The price-feed aggregator. `addOracle` maps an asset to the wrapper
    /// answering for its price.
    interface IPriceFeed {
        function setUp(address verificator) external;
        function addOracle(address token, address primaryOracle, address secondaryOracle) external;
    }
}

sol! {
    /// Wrapper normalizing Chainlink aggregators (price + optional index).
    interface IChainlinkWrapper {
        function setUp(address flagSEQ, address flagsContract) external;
        function addOracle(address token, address priceAggregator, address indexAggregator) external;
    }
}

sol! {
    /// Wrapper for push-based external oracles, driven by raw call payloads.
    interface ICustomOracleWrapper {
        function setUp() external;
        function addOracle(
            address token,
            address externalOracle,
            uint8 decimals,
            bytes calldata callCurrentPrice,
            bytes calldata callLastPrice,
            bytes calldata callLastUpdate,
            bytes calldata callDecimals
        ) external;
    }
}

sol! {
    /// Wrapper pricing tokens through a time-weighted AMM pool.
    interface ITwapOracleWrapper {
        function addOracle(address token, address pool) external;
    }
}

sol! {
    interface IMockERC20 {
        function setUp(string memory name, string memory symbol, uint8 decimals) external;
    }

    interface IMockOracle {
        function setUp(uint256 price, uint256 lastPrice, uint8 decimals) external;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_core::primitives::{Address, Bytes, U256, address};
    use alloy_core::sol_types::SolCall;

    #[test]
    fn test_owner_selector() {
        // keccak256("owner()")[..4]
        assert_eq!(IOwnable::ownerCall::SELECTOR, [0x8d, 0xa5, 0xcb, 0x5b]);
        // keccak256("transferOwnership(address)")[..4]
        assert_eq!(
            IOwnable::transferOwnershipCall::SELECTOR,
            [0xf2, 0xfd, 0xe3, 0x8b]
        );
    }

    #[test]
    fn test_transfer_ownership_encoding() {
        let admin = address!("4A4651B31d747D1DdbDDADCF1b1E24a5f6dcc7b0");
        let data = IOwnable::transferOwnershipCall { newOwner: admin }.abi_encode();

        // Selector + one left-padded address word.
        assert_eq!(data.len(), 4 + 32);
        assert_eq!(
            hex::encode(&data[4..]),
            "0000000000000000000000004a4651b31d747d1ddbddadcf1b1e24a5f6dcc7b0"
        );
    }

    #[test]
    fn test_custom_add_oracle_dynamic_payloads() {
        let data = ICustomOracleWrapper::addOracleCall {
            token: Address::repeat_byte(0x11),
            externalOracle: Address::repeat_byte(0x22),
            decimals: 18,
            callCurrentPrice: Bytes::from_static(&[0x9d, 0x1b, 0x46, 0x4a]),
            callLastPrice: Bytes::from_static(&[0x05, 0x3f, 0x14, 0xda]),
            callLastUpdate: Bytes::new(),
            callDecimals: Bytes::from_static(&[0x31, 0x3c, 0xe5, 0x67]),
        }
        .abi_encode();

        let decoded = ICustomOracleWrapper::addOracleCall::abi_decode(&data, true).unwrap();
        assert_eq!(decoded.decimals, 18);
        assert_eq!(decoded.callCurrentPrice.as_ref(), &[0x9d, 0x1b, 0x46, 0x4a][..]);
        assert!(decoded.callLastUpdate.is_empty());

        // Head: 7 words (3 static params + 4 offsets into the tail).
        let head = &data[4..];
        assert_eq!(
            u64::from_be_bytes(head[96 + 24..128].try_into().unwrap()),
            7 * 32,
            "first dynamic payload offset points past the head"
        );
    }

    #[test]
    fn test_mock_erc20_set_up_encoding() {
        let data = IMockERC20::setUpCall {
            name: "gohm".to_string(),
            symbol: "gohm".to_string(),
            decimals: 18,
        }
        .abi_encode();

        let decoded = IMockERC20::setUpCall::abi_decode(&data, true).unwrap();
        assert_eq!(decoded.name, "gohm");
        assert_eq!(decoded.symbol, "gohm");
        assert_eq!(decoded.decimals, 18);
    }

    #[test]
    fn test_mock_oracle_set_up_encoding() {
        let data = IMockOracle::setUpCall {
            price: U256::from(2_735_860_000_000u64),
            lastPrice: U256::from(2_735_860_000_000u64),
            decimals: 9,
        }
        .abi_encode();

        let decoded = IMockOracle::setUpCall::abi_decode(&data, true).unwrap();
        assert_eq!(decoded.price, U256::from(2_735_860_000_000u64));
        assert_eq!(decoded.decimals, 9);
    }
}
