//! Definitions of the Solidity functions called while configuring deployed contracts.

use alloy_core::sol;

sol! {
    /// The NATION governance token.
    interface INation {
        function mint(address to, uint256 amount) external;
        function approve(address spender, uint256 amount) external returns (bool);
    }

    /// The boosted liquidity rewards distributor.
    interface IBoostedLiquidityDistributor {
        function initialize(address rewardsToken, address lpToken, address boostToken) external;
        function setRewards(uint256 amount, uint256 startBlock, uint256 endBlock) external;
    }

    /// The Merkle airdrop distributor.
    interface IMerkleDistributorV2 {
        function setUp(address owner, address token, bytes32 merkleRoot) external;
    }

    /// The passport NFT.
    interface IPassport {
        function transferControl(address newController) external;
    }

    /// The passport issuer.
    interface IPassportIssuer {
        function initialize(address claimToken, address passport, uint256 maxIssuances) external;
        function setParams(uint256 revokeUnderBalance, uint256 claimRequiredBalance) external;
        function setStatement(string statement) external;
        function setTermsURI(string termsURI) external;
        function setEnabled(bool enabled) external;
    }
}
